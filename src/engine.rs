use crate::calculations::{MetricCalculator, MetricValue, ResourceAllocationAnalyzer, RiskAggregator};
use crate::config::{ConfigError, EngineConfig};
use crate::milestone::MilestoneSummary;
use crate::report::{Report, ReportAssembler, ReportWarning};
use crate::snapshot::{ProjectSnapshot, SnapshotId};
use crate::validation::{TaskViolation, duplicate_names, screen_tasks};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data quality check failed: {}", format_violations(.violations))]
    DataQuality { violations: Vec<TaskViolation> },
    #[error("{component} was computed from {found}, expected {expected}")]
    SnapshotMismatch {
        component: &'static str,
        expected: SnapshotId,
        found: SnapshotId,
    },
}

impl EngineError {
    /// Every violation behind a strict-mode failure; empty for other errors.
    pub fn violations(&self) -> &[TaskViolation] {
        match self {
            Self::DataQuality { violations } => violations,
            Self::SnapshotMismatch { .. } => &[],
        }
    }
}

fn format_violations(violations: &[TaskViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turns a project snapshot into a [`Report`].
///
/// The configuration is checked once here and never changes afterwards, so
/// one engine can analyse any number of snapshots.
#[derive(Debug, Clone)]
pub struct EvmEngine {
    config: EngineConfig,
    threshold: usize,
}

impl EvmEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let threshold = config.checked_threshold()?;
        Ok(Self { config, threshold })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, snapshot: &ProjectSnapshot) -> Result<Report, EngineError> {
        debug!(
            snapshot = %snapshot.id(),
            tasks = snapshot.tasks().len(),
            milestones = snapshot.milestones().len(),
            mode = %self.config.validation_mode,
            "analysing project snapshot"
        );

        let screening = screen_tasks(snapshot);
        let mut assembler = ReportAssembler::new(&screening, self.config.validation_mode)?;

        for name in duplicate_names(screening.valid.iter().map(|valid| valid.task)) {
            assembler.push_warning(ReportWarning::DuplicateTaskName { task: name });
        }

        let metrics = MetricCalculator::compute(&screening.valid);
        let allocation = ResourceAllocationAnalyzer::new(self.threshold).analyze(&screening.valid);
        let risk = RiskAggregator::aggregate(&screening.valid);
        let milestones = MilestoneSummary::summarize(snapshot);

        if !metrics.aggregate.eac.is_value() {
            let cpi = metrics.aggregate.cpi;
            warn!(%cpi, "estimate at completion is not computable");
            assembler.push_warning(ReportWarning::EacNotComputable { cpi });
        } else if let MetricValue::Value(cpi) = metrics.aggregate.cpi {
            debug!(cpi, "aggregate cost performance computed");
        }

        let report = assembler.assemble(metrics, allocation, risk, milestones)?;
        debug!(
            snapshot = %report.snapshot_id(),
            valid_tasks = report.tasks().len(),
            warnings = report.warnings().len(),
            "report assembled"
        );
        Ok(report)
    }
}
