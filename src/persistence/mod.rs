use crate::snapshot::ProjectSnapshot;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Reads the task sheet and, when given, the milestone document into one
/// snapshot.
pub fn load_snapshot<P, Q>(tasks_csv: P, milestones_json: Option<Q>) -> PersistenceResult<ProjectSnapshot>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let tasks = load_tasks_from_csv(tasks_csv)?;
    let milestones = match milestones_json {
        Some(path) => load_milestones_from_json(path)?,
        None => Vec::new(),
    };
    Ok(ProjectSnapshot::new(tasks, milestones))
}

pub mod export;
pub mod file;

pub use export::{export_chart_data, save_budget_series_csv, save_risk_matrix_csv};
pub use file::{load_milestones_from_json, load_tasks_from_csv, read_milestones_json, read_tasks_csv};
