use super::PersistenceResult;
use crate::calculations::RiskMatrix;
use crate::report::Report;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

pub const BUDGET_SERIES_FILE: &str = "budget_series.csv";
pub const RISK_HEATMAP_FILE: &str = "risk_heatmap.csv";

#[derive(Serialize)]
struct BudgetSeriesRecord<'a> {
    task: &'a str,
    planned_value: f64,
    actual_cost: f64,
    earned_value: f64,
}

/// PV / AC / EV per task, the data behind the budget comparison chart.
pub fn save_budget_series_csv<P: AsRef<Path>>(report: &Report, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for task in report.tasks() {
        writer.serialize(BudgetSeriesRecord {
            task: &task.name,
            planned_value: task.planned_value,
            actual_cost: task.actual_cost,
            earned_value: task.earned_value,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Dense department x risk-level grid for the heatmap, zeros included.
pub fn save_risk_matrix_csv<P: AsRef<Path>>(matrix: &RiskMatrix, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);

    let mut header = vec!["department".to_string()];
    header.extend(matrix.risk_levels().iter().map(|level| format!("risk_{level}")));
    writer.write_record(&header)?;

    for department in matrix.departments() {
        let mut row = vec![department.clone()];
        row.extend(
            matrix
                .risk_levels()
                .iter()
                .map(|level| matrix.count(department, *level).to_string()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes both chart datasets into `dir`, creating it if needed.
pub fn export_chart_data<P: AsRef<Path>>(report: &Report, dir: P) -> PersistenceResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let budget = dir.join(BUDGET_SERIES_FILE);
    save_budget_series_csv(report, &budget)?;
    info!(path = %budget.display(), "budget series saved");

    let heatmap = dir.join(RISK_HEATMAP_FILE);
    save_risk_matrix_csv(report.risk_matrix(), &heatmap)?;
    info!(path = %heatmap.display(), "risk heatmap data saved");

    Ok(vec![budget, heatmap])
}
