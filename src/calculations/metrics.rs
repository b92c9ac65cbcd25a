use crate::snapshot::SnapshotId;
use crate::validation::TaskSet;
use serde::Serialize;
use std::fmt;

/// A ratio-derived metric. Zero denominators produce a tag, never a fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Value(f64),
    /// Per-task ratio with a zero denominator.
    NotApplicable,
    /// Aggregate figure that cannot be derived from the totals.
    NotComputable,
}

impl MetricValue {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotApplicable | Self::NotComputable => None,
        }
    }

    pub fn is_value(self) -> bool {
        matches!(self, Self::Value(_))
    }

    fn ratio(numerator: f64, denominator: f64, undefined: MetricValue) -> Self {
        if denominator == 0.0 {
            undefined
        } else {
            Self::Value(numerator / denominator)
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::NotApplicable => f.write_str("N/A"),
            Self::NotComputable => f.write_str("not computable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskMetrics {
    pub name: String,
    pub planned_value: f64,
    pub actual_cost: f64,
    pub earned_value: f64,
    pub cpi: MetricValue,
    pub spi: MetricValue,
    /// Task-level forecast, `planned_value / cpi`.
    pub eac: MetricValue,
    pub vac: MetricValue,
}

impl TaskMetrics {
    pub fn compute(name: &str, planned_value: f64, actual_cost: f64, earned_value: f64) -> Self {
        let cpi = MetricValue::ratio(earned_value, actual_cost, MetricValue::NotApplicable);
        let spi = MetricValue::ratio(earned_value, planned_value, MetricValue::NotApplicable);
        let eac = match cpi {
            MetricValue::Value(c) if c > 0.0 => MetricValue::Value(planned_value / c),
            _ => MetricValue::NotApplicable,
        };
        let vac = match eac {
            MetricValue::Value(e) => MetricValue::Value(planned_value - e),
            other => other,
        };
        Self {
            name: name.to_string(),
            planned_value,
            actual_cost,
            earned_value,
            cpi,
            spi,
            eac,
            vac,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvmTotals {
    pub planned_value: f64,
    pub actual_cost: f64,
    pub earned_value: f64,
    pub budget_at_completion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Favorable,
    Unfavorable,
}

/// Reading of a performance index against the 1.0 baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceIndicator {
    pub outlook: Outlook,
    /// `|1 - index| * 100`.
    pub variance_pct: f64,
}

impl PerformanceIndicator {
    pub fn from_index(index: MetricValue) -> Option<Self> {
        let index = index.value()?;
        let outlook = if index > 1.0 {
            Outlook::Favorable
        } else {
            Outlook::Unfavorable
        };
        Some(Self {
            outlook,
            variance_pct: (1.0 - index).abs() * 100.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub totals: EvmTotals,
    pub bac: f64,
    pub cpi: MetricValue,
    pub spi: MetricValue,
    pub eac: MetricValue,
    pub vac: MetricValue,
}

impl AggregateMetrics {
    pub fn from_totals(totals: EvmTotals) -> Self {
        let bac = totals.budget_at_completion;
        let cpi = MetricValue::ratio(totals.earned_value, totals.actual_cost, MetricValue::NotComputable);
        let spi = MetricValue::ratio(totals.earned_value, totals.planned_value, MetricValue::NotComputable);
        // A zero CPI means nothing earned against a nonzero cost.
        let eac = match cpi {
            MetricValue::Value(c) if c > 0.0 => MetricValue::Value(bac / c),
            _ => MetricValue::NotComputable,
        };
        let vac = match eac {
            MetricValue::Value(e) => MetricValue::Value(bac - e),
            _ => MetricValue::NotComputable,
        };
        Self {
            totals,
            bac,
            cpi,
            spi,
            eac,
            vac,
        }
    }

    pub fn cost_indicator(&self) -> Option<PerformanceIndicator> {
        PerformanceIndicator::from_index(self.cpi)
    }

    pub fn schedule_indicator(&self) -> Option<PerformanceIndicator> {
        PerformanceIndicator::from_index(self.spi)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvmMetrics {
    #[serde(skip)]
    pub(crate) snapshot_id: SnapshotId,
    pub tasks: Vec<TaskMetrics>,
    pub aggregate: AggregateMetrics,
}

impl EvmMetrics {
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    /// First task with the given name.
    pub fn task(&self, name: &str) -> Option<&TaskMetrics> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

pub struct MetricCalculator;

impl MetricCalculator {
    pub fn compute(tasks: &TaskSet<'_>) -> EvmMetrics {
        let mut totals = EvmTotals::default();
        let mut per_task = Vec::with_capacity(tasks.len());

        for valid in tasks.iter() {
            let task = valid.task;
            totals.planned_value += task.planned_value;
            totals.actual_cost += task.actual_cost;
            totals.earned_value += task.earned_value;
            per_task.push(TaskMetrics::compute(
                &task.name,
                task.planned_value,
                task.actual_cost,
                task.earned_value,
            ));
        }
        totals.budget_at_completion = totals.planned_value;

        EvmMetrics {
            snapshot_id: tasks.snapshot_id(),
            tasks: per_task,
            aggregate: AggregateMetrics::from_totals(totals),
        }
    }
}
