pub mod calculations;
pub mod config;
pub mod engine;
pub mod milestone;
pub mod persistence;
pub mod render;
pub mod report;
pub mod snapshot;
pub mod task;
pub mod validation;

pub use calculations::{
    AggregateMetrics, EvmMetrics, EvmTotals, MetricCalculator, MetricValue, Outlook,
    PerformanceIndicator, ResourceAllocation, ResourceAllocationAnalyzer, ResourceLoad,
    RiskAggregator, RiskMatrix, TaskMetrics,
};
pub use config::{ConfigError, EngineConfig, ValidationMode};
pub use engine::{EngineError, EvmEngine};
pub use milestone::{Milestone, MilestoneStatusCounts, MilestoneSummary};
pub use persistence::{
    PersistenceError, export_chart_data, load_milestones_from_json, load_snapshot,
    load_tasks_from_csv,
};
pub use report::{Report, ReportAssembler, ReportWarning};
pub use snapshot::{ProjectSnapshot, SnapshotId};
pub use task::{RiskLevel, Task, TaskStatus};
pub use validation::{TaskSet, TaskViolation, ViolationKind};
