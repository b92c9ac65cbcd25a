use crate::snapshot::SnapshotId;
use crate::validation::TaskSet;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLoad {
    pub resource_name: String,
    pub active_tasks: usize,
    /// Names of the tasks that are not completed, in snapshot order.
    pub active_task_names: Vec<String>,
    pub over_allocated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceAllocation {
    #[serde(skip)]
    pub(crate) snapshot_id: SnapshotId,
    pub threshold: usize,
    /// Every resource seen, busiest first, ties by name.
    pub distribution: Vec<ResourceLoad>,
    /// Active task count per department.
    pub department_load: BTreeMap<String, usize>,
}

impl ResourceAllocation {
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot_id
    }

    pub fn over_allocated(&self) -> impl Iterator<Item = &ResourceLoad> {
        self.distribution.iter().filter(|load| load.over_allocated)
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceLoad> {
        self.distribution.iter().find(|load| load.resource_name == name)
    }
}

pub struct ResourceAllocationAnalyzer {
    threshold: usize,
}

impl ResourceAllocationAnalyzer {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn analyze(&self, tasks: &TaskSet<'_>) -> ResourceAllocation {
        let mut by_resource: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut department_load: BTreeMap<String, usize> = BTreeMap::new();

        for valid in tasks.iter() {
            let task = valid.task;
            let active = by_resource.entry(task.resource_name.as_str()).or_default();
            // Completed work no longer occupies the resource.
            if task.status.is_completed() {
                continue;
            }
            active.push(task.name.clone());
            *department_load.entry(task.department.clone()).or_insert(0) += 1;
        }

        let mut distribution: Vec<ResourceLoad> = by_resource
            .into_iter()
            .map(|(resource_name, active_task_names)| ResourceLoad {
                resource_name: resource_name.to_string(),
                active_tasks: active_task_names.len(),
                over_allocated: active_task_names.len() > self.threshold,
                active_task_names,
            })
            .collect();
        distribution.sort_by(|a, b| {
            b.active_tasks
                .cmp(&a.active_tasks)
                .then_with(|| a.resource_name.cmp(&b.resource_name))
        });

        ResourceAllocation {
            snapshot_id: tasks.snapshot_id(),
            threshold: self.threshold,
            distribution,
            department_load,
        }
    }
}
