use super::{PersistenceError, PersistenceResult};
use crate::milestone::Milestone;
use crate::task::{Task, TaskStatus};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One row of the project task sheet, as text.
#[derive(Deserialize)]
struct TaskCsvRecord {
    #[serde(rename = "Task_Name")]
    task_name: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Resource_Name")]
    resource_name: String,
    #[serde(rename = "Planned_Value")]
    planned_value: String,
    #[serde(rename = "Actual_Cost")]
    actual_cost: String,
    #[serde(rename = "Earned_Value")]
    earned_value: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Risk_Level")]
    risk_level: String,
    #[serde(rename = "Estimated_Completion_Date", default)]
    estimated_completion_date: String,
}

impl TaskCsvRecord {
    // Range checks belong to the engine; only unparseable cells fail here.
    fn into_task(self, row: usize) -> PersistenceResult<Task> {
        Ok(Task {
            name: self.task_name.trim().to_string(),
            department: self.department.trim().to_string(),
            resource_name: self.resource_name.trim().to_string(),
            planned_value: parse_f64(&self.planned_value, "Planned_Value", row)?,
            actual_cost: parse_f64(&self.actual_cost, "Actual_Cost", row)?,
            earned_value: parse_f64(&self.earned_value, "Earned_Value", row)?,
            status: TaskStatus::parse(&self.status),
            risk_level: parse_i64(&self.risk_level, "Risk_Level", row)?,
            estimated_completion_date: parse_date(&self.estimated_completion_date, row)?,
        })
    }
}

pub fn read_tasks_csv<R: Read>(reader: R) -> PersistenceResult<Vec<Task>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut tasks = Vec::new();
    for (idx, record) in reader.deserialize::<TaskCsvRecord>().enumerate() {
        let record = record?;
        tasks.push(record.into_task(idx + 1)?);
    }

    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no tasks".into(),
        ));
    }
    Ok(tasks)
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let path = path.as_ref();
    let tasks = read_tasks_csv(File::open(path)?)?;
    debug!(path = %path.display(), tasks = tasks.len(), "loaded task sheet");
    Ok(tasks)
}

#[derive(Deserialize)]
struct MilestoneDocument {
    milestones: Vec<Milestone>,
}

pub fn read_milestones_json<R: Read>(reader: R) -> PersistenceResult<Vec<Milestone>> {
    let document: MilestoneDocument = serde_json::from_reader(reader)?;
    Ok(document.milestones)
}

pub fn load_milestones_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Milestone>> {
    let path = path.as_ref();
    let milestones = read_milestones_json(File::open(path)?)?;
    debug!(path = %path.display(), milestones = milestones.len(), "loaded milestones");
    Ok(milestones)
}

fn parse_f64(input: &str, column: &str, row: usize) -> PersistenceResult<f64> {
    let cleaned = input.trim().trim_start_matches('$').replace(',', "");
    cleaned.parse::<f64>().map_err(|e| {
        PersistenceError::InvalidData(format!("row {row}: invalid {column} '{input}': {e}"))
    })
}

fn parse_i64(input: &str, column: &str, row: usize) -> PersistenceResult<i64> {
    input.trim().parse::<i64>().map_err(|e| {
        PersistenceError::InvalidData(format!("row {row}: invalid {column} '{input}': {e}"))
    })
}

fn parse_date(input: &str, row: usize) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("row {row}: invalid date '{input}': {e}")))
}
