use crate::snapshot::SnapshotId;
use crate::task::RiskLevel;
use crate::validation::TaskSet;
use polars::prelude::*;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Department x risk-level task counts over the observed values only.
///
/// Iteration is ordered by department, then risk level. Cells missing from
/// `cells` are zero.
#[derive(Debug, Clone, Serialize)]
pub struct RiskMatrix {
    #[serde(skip)]
    pub(crate) snapshot_id: SnapshotId,
    #[serde(serialize_with = "serialize_cells")]
    cells: BTreeMap<(String, RiskLevel), usize>,
    departments: BTreeSet<String>,
    risk_levels: BTreeSet<RiskLevel>,
}

#[derive(Serialize)]
struct CellRecord<'a> {
    department: &'a str,
    risk_level: RiskLevel,
    count: usize,
}

fn serialize_cells<S: Serializer>(
    cells: &BTreeMap<(String, RiskLevel), usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(cells.iter().map(|((department, risk_level), count)| CellRecord {
        department,
        risk_level: *risk_level,
        count: *count,
    }))
}

impl RiskMatrix {
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    pub fn count(&self, department: &str, risk_level: RiskLevel) -> usize {
        self.cells
            .get(&(department.to_string(), risk_level))
            .copied()
            .unwrap_or(0)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, RiskLevel, usize)> {
        self.cells
            .iter()
            .map(|((department, level), count)| (department.as_str(), *level, *count))
    }

    pub fn departments(&self) -> &BTreeSet<String> {
        &self.departments
    }

    pub fn risk_levels(&self) -> &BTreeSet<RiskLevel> {
        &self.risk_levels
    }

    pub fn total(&self) -> usize {
        self.cells.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Dense grid: a `department` column plus one `risk_<n>` column per observed
    /// level, with zeros in unobserved cells.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.risk_levels.len() + 1);

        let departments: Vec<&str> = self.departments.iter().map(String::as_str).collect();
        columns.push(
            Series::new(PlSmallStr::from_static("department"), departments).into_column(),
        );

        for level in &self.risk_levels {
            let counts: Vec<u32> = self
                .departments
                .iter()
                .map(|dept| self.count(dept, *level) as u32)
                .collect();
            columns.push(Series::new(format!("risk_{level}").into(), counts).into_column());
        }

        DataFrame::new(columns)
    }
}

pub struct RiskAggregator;

impl RiskAggregator {
    pub fn aggregate(tasks: &TaskSet<'_>) -> RiskMatrix {
        let mut cells = BTreeMap::new();
        let mut departments = BTreeSet::new();
        let mut risk_levels = BTreeSet::new();

        for valid in tasks.iter() {
            let department = valid.task.department.clone();
            departments.insert(department.clone());
            risk_levels.insert(valid.risk_level);
            *cells.entry((department, valid.risk_level)).or_insert(0) += 1;
        }

        RiskMatrix {
            snapshot_id: tasks.snapshot_id(),
            cells,
            departments,
            risk_levels,
        }
    }
}
