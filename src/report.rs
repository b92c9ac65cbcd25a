use crate::calculations::{
    AggregateMetrics, EvmMetrics, MetricValue, Outlook, PerformanceIndicator, ResourceAllocation,
    RiskMatrix, TaskMetrics,
};
use crate::config::ValidationMode;
use crate::engine::EngineError;
use crate::milestone::MilestoneSummary;
use crate::snapshot::SnapshotId;
use crate::task::Task;
use crate::validation::{Screening, TaskSet, TaskViolation};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// Left out of every figure because it broke a record invariant.
    ExcludedTask {
        task: String,
        index: usize,
        reasons: Vec<String>,
    },
    DuplicateTaskName { task: String },
    EacNotComputable { cpi: MetricValue },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedTask {
                task,
                index,
                reasons,
            } => write!(
                f,
                "excluded task '{task}' (row {}): {}",
                index + 1,
                reasons.join(", ")
            ),
            Self::DuplicateTaskName { task } => {
                write!(f, "task name '{task}' appears more than once")
            }
            Self::EacNotComputable { cpi } => write!(
                f,
                "estimate at completion is not computable (aggregate CPI: {cpi})"
            ),
        }
    }
}

fn exclusion_warnings(violations: &[TaskViolation]) -> Vec<ReportWarning> {
    let mut warnings: Vec<ReportWarning> = Vec::new();
    for violation in violations {
        match warnings.last_mut() {
            Some(ReportWarning::ExcludedTask { index, reasons, .. })
                if *index == violation.index =>
            {
                reasons.push(violation.kind.to_string());
            }
            _ => warnings.push(ReportWarning::ExcludedTask {
                task: violation.task.clone(),
                index: violation.index,
                reasons: vec![violation.kind.to_string()],
            }),
        }
    }
    warnings
}

/// Immutable result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    snapshot_id: SnapshotId,
    validation_mode: ValidationMode,
    aggregate: AggregateMetrics,
    task_metrics: Vec<TaskMetrics>,
    tasks: Vec<Task>,
    allocation: ResourceAllocation,
    risk_matrix: RiskMatrix,
    milestones: MilestoneSummary,
    warnings: Vec<ReportWarning>,
    excluded_tasks: Vec<String>,
}

/// Composes component outputs into a [`Report`].
///
/// Each output must come from the same snapshot as the validated task set;
/// the check is by snapshot identity, not by comparing task data.
pub struct ReportAssembler<'s, 'a> {
    tasks: &'s TaskSet<'a>,
    mode: ValidationMode,
    warnings: Vec<ReportWarning>,
    excluded_tasks: Vec<String>,
}

impl<'s, 'a> ReportAssembler<'s, 'a> {
    /// Fails in strict mode when the screening found any violation.
    pub fn new(screening: &'s Screening<'a>, mode: ValidationMode) -> Result<Self, EngineError> {
        if !screening.violations.is_empty() && mode == ValidationMode::Strict {
            return Err(EngineError::DataQuality {
                violations: screening.violations.clone(),
            });
        }

        let warnings = exclusion_warnings(&screening.violations);
        for warning in &warnings {
            warn!("{warning}");
        }

        Ok(Self {
            tasks: &screening.valid,
            mode,
            warnings,
            excluded_tasks: screening.rejected_tasks(),
        })
    }

    pub fn push_warning(&mut self, warning: ReportWarning) {
        self.warnings.push(warning);
    }

    fn check_source(&self, component: &'static str, found: SnapshotId) -> Result<(), EngineError> {
        let expected = self.tasks.snapshot_id();
        if found != expected {
            return Err(EngineError::SnapshotMismatch {
                component,
                expected,
                found,
            });
        }
        Ok(())
    }

    pub fn assemble(
        self,
        metrics: EvmMetrics,
        allocation: ResourceAllocation,
        risk_matrix: RiskMatrix,
        milestones: MilestoneSummary,
    ) -> Result<Report, EngineError> {
        self.check_source("metrics", metrics.snapshot_id())?;
        self.check_source("resource allocation", allocation.snapshot_id())?;
        self.check_source("risk matrix", risk_matrix.snapshot_id())?;
        self.check_source("milestone summary", milestones.snapshot_id())?;

        Ok(Report {
            snapshot_id: self.tasks.snapshot_id(),
            validation_mode: self.mode,
            aggregate: metrics.aggregate,
            task_metrics: metrics.tasks,
            tasks: self.tasks.iter().map(|valid| valid.task.clone()).collect(),
            allocation,
            risk_matrix,
            milestones,
            warnings: self.warnings,
            excluded_tasks: self.excluded_tasks,
        })
    }
}

impl Report {
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    pub fn aggregate(&self) -> &AggregateMetrics {
        &self.aggregate
    }

    pub fn task_metrics(&self) -> &[TaskMetrics] {
        &self.task_metrics
    }

    pub fn task_metric(&self, name: &str) -> Option<&TaskMetrics> {
        self.task_metrics.iter().find(|t| t.name == name)
    }

    /// Valid tasks, in snapshot order, aligned with [`Report::task_metrics`].
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn allocation(&self) -> &ResourceAllocation {
        &self.allocation
    }

    pub fn risk_matrix(&self) -> &RiskMatrix {
        &self.risk_matrix
    }

    pub fn milestones(&self) -> &MilestoneSummary {
        &self.milestones
    }

    pub fn warnings(&self) -> &[ReportWarning] {
        &self.warnings
    }

    pub fn excluded_tasks(&self) -> &[String] {
        &self.excluded_tasks
    }

    /// False when lenient validation dropped at least one task.
    pub fn is_complete(&self) -> bool {
        self.excluded_tasks.is_empty()
    }

    pub fn summary_frame(&self) -> PolarsResult<DataFrame> {
        let a = &self.aggregate;
        let rows: [(&str, Option<f64>); 7] = [
            ("Total Budget (PV)", Some(a.totals.planned_value)),
            ("Total Actual Cost (AC)", Some(a.totals.actual_cost)),
            ("Total Earned Value (EV)", Some(a.totals.earned_value)),
            ("Cost Performance Index (CPI)", a.cpi.value()),
            ("Schedule Performance Index (SPI)", a.spi.value()),
            ("Estimate at Completion (EAC)", a.eac.value()),
            ("Variance at Completion (VAC)", a.vac.value()),
        ];
        let metrics: Vec<&str> = rows.iter().map(|(label, _)| *label).collect();
        let values: Vec<Option<f64>> = rows.iter().map(|(_, value)| *value).collect();
        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("metric"), metrics).into_column(),
            Series::new(PlSmallStr::from_static("value"), values).into_column(),
        ])
    }

    pub fn indicator_frame(&self) -> PolarsResult<DataFrame> {
        fn describe(
            indicator: Option<PerformanceIndicator>,
            favorable: &'static str,
            unfavorable: &'static str,
        ) -> (&'static str, Option<f64>) {
            match indicator {
                Some(i) if i.outlook == Outlook::Favorable => (favorable, Some(i.variance_pct)),
                Some(i) => (unfavorable, Some(i.variance_pct)),
                None => ("Not computable", None),
            }
        }

        let cost = describe(self.aggregate.cost_indicator(), "Under Budget", "Over Budget");
        let schedule = describe(
            self.aggregate.schedule_indicator(),
            "Ahead of Schedule",
            "Behind Schedule",
        );
        DataFrame::new(vec![
            Series::new(
                PlSmallStr::from_static("category"),
                ["Cost Performance", "Schedule Performance"],
            )
            .into_column(),
            Series::new(PlSmallStr::from_static("status"), [cost.0, schedule.0]).into_column(),
            Series::new(PlSmallStr::from_static("variance_pct"), [cost.1, schedule.1])
                .into_column(),
        ])
    }

    pub fn task_frame(&self) -> PolarsResult<DataFrame> {
        let height = self.tasks.len();
        let mut names = Vec::with_capacity(height);
        let mut departments = Vec::with_capacity(height);
        let mut resources = Vec::with_capacity(height);
        let mut planned = Vec::with_capacity(height);
        let mut actual = Vec::with_capacity(height);
        let mut earned = Vec::with_capacity(height);
        let mut cpi = Vec::with_capacity(height);
        let mut spi = Vec::with_capacity(height);
        let mut risk = Vec::with_capacity(height);
        let mut status = Vec::with_capacity(height);
        let mut completion = Vec::with_capacity(height);

        for (task, metrics) in self.tasks.iter().zip(&self.task_metrics) {
            names.push(task.name.as_str());
            departments.push(task.department.as_str());
            resources.push(task.resource_name.as_str());
            planned.push(task.planned_value);
            actual.push(task.actual_cost);
            earned.push(task.earned_value);
            cpi.push(metrics.cpi.value());
            spi.push(metrics.spi.value());
            risk.push(task.risk_level);
            status.push(task.status.as_str());
            completion.push(task.estimated_completion_date);
        }

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("task"), names).into_column(),
            Series::new(PlSmallStr::from_static("department"), departments).into_column(),
            Series::new(PlSmallStr::from_static("resource"), resources).into_column(),
            Series::new(PlSmallStr::from_static("planned_value"), planned).into_column(),
            Series::new(PlSmallStr::from_static("actual_cost"), actual).into_column(),
            Series::new(PlSmallStr::from_static("earned_value"), earned).into_column(),
            Series::new(PlSmallStr::from_static("cpi"), cpi).into_column(),
            Series::new(PlSmallStr::from_static("spi"), spi).into_column(),
            Series::new(PlSmallStr::from_static("risk"), risk).into_column(),
            Series::new(PlSmallStr::from_static("status"), status).into_column(),
            series_from_dates("estimated_completion", &completion)?.into_column(),
        ])
    }

    pub fn allocation_frame(&self) -> PolarsResult<DataFrame> {
        let loads = &self.allocation.distribution;
        let resources: Vec<&str> = loads.iter().map(|l| l.resource_name.as_str()).collect();
        let active: Vec<u32> = loads.iter().map(|l| l.active_tasks as u32).collect();
        let status: Vec<&str> = loads
            .iter()
            .map(|l| if l.over_allocated { "OVERALLOCATED" } else { "Normal" })
            .collect();
        let tasks: Vec<String> = loads.iter().map(|l| l.active_task_names.join(", ")).collect();
        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("resource"), resources).into_column(),
            Series::new(PlSmallStr::from_static("active_tasks"), active).into_column(),
            Series::new(PlSmallStr::from_static("status"), status).into_column(),
            Series::new(PlSmallStr::from_static("tasks"), tasks).into_column(),
        ])
    }

    pub fn milestone_frame(&self) -> PolarsResult<DataFrame> {
        let rows = &self.milestones.milestones;
        let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
        let owners: Vec<Option<&str>> = rows.iter().map(|m| m.owner.as_deref()).collect();
        let targets: Vec<Option<NaiveDate>> = rows.iter().map(|m| m.target_date).collect();
        let completed: Vec<Option<NaiveDate>> = rows.iter().map(|m| m.completion_date).collect();
        let status: Vec<&str> = rows.iter().map(|m| m.status.as_str()).collect();
        let depends_on: Vec<String> = rows.iter().map(|m| m.dependencies.join(", ")).collect();
        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("milestone"), names).into_column(),
            Series::new(PlSmallStr::from_static("owner"), owners).into_column(),
            series_from_dates("target_date", &targets)?.into_column(),
            series_from_dates("completed", &completed)?.into_column(),
            Series::new(PlSmallStr::from_static("status"), status).into_column(),
            Series::new(PlSmallStr::from_static("depends_on"), depends_on).into_column(),
        ])
    }
}

fn series_from_dates(name: &str, dates: &[Option<NaiveDate>]) -> PolarsResult<Series> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(date_to_i32)).collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::default();
    (date - epoch).num_days() as i32
}
