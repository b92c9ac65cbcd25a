use crate::milestone::Milestone;
use crate::task::Task;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one snapshot. Two snapshots built from equal data still get
/// different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SnapshotId(u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot#{}", self.0)
    }
}

/// The engine's unit of work: tasks and milestones frozen for one run.
#[derive(Debug)]
pub struct ProjectSnapshot {
    id: SnapshotId,
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
}

impl ProjectSnapshot {
    pub fn new(tasks: Vec<Task>, milestones: Vec<Milestone>) -> Self {
        let id = SnapshotId(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            tasks,
            milestones,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }
}
