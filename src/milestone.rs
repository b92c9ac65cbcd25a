use crate::snapshot::{ProjectSnapshot, SnapshotId};
use crate::task::TaskStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tracked project checkpoint. Milestones are display data only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub status: TaskStatus,
    /// Names of milestones this one depends on. Not checked for existence.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,
}

impl Milestone {
    pub fn new(name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            name: name.into(),
            status,
            dependencies: Vec::new(),
            owner: None,
            target_date: None,
            completion_date: None,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneStatusCounts {
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub unrecognized: usize,
}

impl MilestoneStatusCounts {
    pub fn total(&self) -> usize {
        self.completed + self.in_progress + self.not_started + self.unrecognized
    }
}

/// Status counts plus the milestone rows passed through for display.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneSummary {
    #[serde(skip)]
    pub(crate) snapshot_id: SnapshotId,
    pub counts: MilestoneStatusCounts,
    pub milestones: Vec<Milestone>,
    /// Open milestones with at least one dependency that is known and not yet
    /// completed, in snapshot order.
    pub blocked: Vec<String>,
}

impl MilestoneSummary {
    pub fn summarize(snapshot: &ProjectSnapshot) -> Self {
        let milestones = snapshot.milestones();
        let mut counts = MilestoneStatusCounts::default();
        for milestone in milestones {
            match milestone.status {
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::NotStarted => counts.not_started += 1,
                TaskStatus::Unrecognized(_) => counts.unrecognized += 1,
            }
        }

        let status_by_name: HashMap<&str, &TaskStatus> = milestones
            .iter()
            .map(|m| (m.name.as_str(), &m.status))
            .collect();
        let blocked = milestones
            .iter()
            .filter(|m| !m.status.is_completed())
            .filter(|m| {
                m.dependencies.iter().any(|dep| {
                    status_by_name
                        .get(dep.as_str())
                        .is_some_and(|status| !status.is_completed())
                })
            })
            .map(|m| m.name.clone())
            .collect();

        Self {
            snapshot_id: snapshot.id(),
            counts,
            milestones: milestones.to_vec(),
            blocked,
        }
    }

    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }
}
