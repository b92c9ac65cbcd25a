use crate::snapshot::{ProjectSnapshot, SnapshotId};
use crate::task::{RiskLevel, Task, TaskStatus};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    EmptyName,
    NegativeAmount { field: &'static str, value: f64 },
    NonFiniteAmount { field: &'static str },
    RiskLevelOutOfRange { value: i64 },
    UnrecognizedStatus { value: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name is empty"),
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} is negative ({value})")
            }
            Self::NonFiniteAmount { field } => write!(f, "{field} is not a finite number"),
            Self::RiskLevelOutOfRange { value } => write!(
                f,
                "risk_level {value} is outside {}..={}",
                RiskLevel::MIN,
                RiskLevel::MAX
            ),
            Self::UnrecognizedStatus { value } => write!(f, "unrecognized status '{value}'"),
        }
    }
}

/// One invariant broken by one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskViolation {
    /// Position of the task in the snapshot.
    pub index: usize,
    pub task: String,
    pub kind: ViolationKind,
}

impl fmt::Display for TaskViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' (row {}): {}", self.task, self.index + 1, self.kind)
    }
}

fn check_amount(field: &'static str, value: f64, out: &mut Vec<ViolationKind>) {
    if !value.is_finite() {
        out.push(ViolationKind::NonFiniteAmount { field });
    } else if value < 0.0 {
        out.push(ViolationKind::NegativeAmount { field, value });
    }
}

/// Every invariant the task breaks, in field order.
pub fn validate_task(task: &Task) -> Vec<ViolationKind> {
    let mut violations = Vec::new();
    if task.name.trim().is_empty() {
        violations.push(ViolationKind::EmptyName);
    }
    check_amount("planned_value", task.planned_value, &mut violations);
    check_amount("actual_cost", task.actual_cost, &mut violations);
    check_amount("earned_value", task.earned_value, &mut violations);
    if let TaskStatus::Unrecognized(raw) = &task.status {
        violations.push(ViolationKind::UnrecognizedStatus { value: raw.clone() });
    }
    if RiskLevel::new(task.risk_level).is_none() {
        violations.push(ViolationKind::RiskLevelOutOfRange {
            value: task.risk_level,
        });
    }
    violations
}

/// A task that passed validation, with its checked risk level.
#[derive(Debug, Clone, Copy)]
pub struct ValidTask<'a> {
    pub task: &'a Task,
    pub risk_level: RiskLevel,
}

/// Read-only view over the valid tasks of one snapshot.
#[derive(Debug, Clone)]
pub struct TaskSet<'a> {
    snapshot_id: SnapshotId,
    tasks: Vec<ValidTask<'a>>,
}

impl<'a> TaskSet<'a> {
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidTask<'a>> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug)]
pub struct Screening<'a> {
    pub valid: TaskSet<'a>,
    pub violations: Vec<TaskViolation>,
}

impl Screening<'_> {
    /// Names of tasks with at least one violation, each once, in snapshot order.
    pub fn rejected_tasks(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.violations
            .iter()
            .filter(|v| seen.insert(v.index))
            .map(|v| v.task.clone())
            .collect()
    }
}

/// Splits the snapshot's tasks into the valid view and the full violation list.
pub fn screen_tasks(snapshot: &ProjectSnapshot) -> Screening<'_> {
    let mut valid = Vec::with_capacity(snapshot.tasks().len());
    let mut violations = Vec::new();

    for (index, task) in snapshot.tasks().iter().enumerate() {
        let kinds = validate_task(task);
        match RiskLevel::new(task.risk_level) {
            Some(risk_level) if kinds.is_empty() => valid.push(ValidTask { task, risk_level }),
            _ => violations.extend(kinds.into_iter().map(|kind| TaskViolation {
                index,
                task: task.name.clone(),
                kind,
            })),
        }
    }

    Screening {
        valid: TaskSet {
            snapshot_id: snapshot.id(),
            tasks: valid,
        },
        violations,
    }
}

/// Names that appear on more than one task, sorted.
pub fn duplicate_names<'t>(tasks: impl IntoIterator<Item = &'t Task>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = tasks
        .into_iter()
        .filter(|t| !seen.insert(t.name.as_str()))
        .map(|t| t.name.clone())
        .collect();
    duplicates.sort();
    duplicates.dedup();
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_task_reports_every_violation() {
        let task = Task::new("", -10.0, f64::NAN, 5.0)
            .with_status(TaskStatus::Unrecognized("Blocked".into()))
            .with_risk_level(9);
        let kinds = validate_task(&task);
        assert_eq!(kinds.len(), 5);
        assert_eq!(kinds[0], ViolationKind::EmptyName);
        assert!(matches!(
            kinds[1],
            ViolationKind::NegativeAmount { field: "planned_value", .. }
        ));
        assert_eq!(
            kinds[2],
            ViolationKind::NonFiniteAmount { field: "actual_cost" }
        );
        assert!(matches!(kinds[3], ViolationKind::UnrecognizedStatus { .. }));
        assert_eq!(kinds[4], ViolationKind::RiskLevelOutOfRange { value: 9 });
    }

    #[test]
    fn zero_amounts_are_valid() {
        let task = Task::new("Kickoff", 0.0, 0.0, 0.0).with_risk_level(1);
        assert!(validate_task(&task).is_empty());
    }

    #[test]
    fn screening_keeps_valid_tasks_in_order() {
        let snapshot = ProjectSnapshot::new(
            vec![
                Task::new("A", 1.0, 1.0, 1.0).with_risk_level(2),
                Task::new("B", 1.0, 1.0, 1.0).with_risk_level(0),
                Task::new("C", 1.0, 1.0, 1.0).with_risk_level(5),
            ],
            Vec::new(),
        );
        let screening = screen_tasks(&snapshot);
        let names: Vec<&str> = screening.valid.iter().map(|v| v.task.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(screening.rejected_tasks(), vec!["B".to_string()]);
        assert_eq!(screening.valid.snapshot_id(), snapshot.id());
    }

    #[test]
    fn duplicate_names_are_listed_once() {
        let tasks = vec![
            Task::new("Build", 1.0, 1.0, 1.0),
            Task::new("Test", 1.0, 1.0, 1.0),
            Task::new("Build", 1.0, 1.0, 1.0),
            Task::new("Build", 1.0, 1.0, 1.0),
        ];
        assert_eq!(duplicate_names(&tasks), vec!["Build".to_string()]);
    }
}
