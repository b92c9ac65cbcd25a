pub mod allocation;
pub mod metrics;
pub mod risk;

pub use allocation::{ResourceAllocation, ResourceAllocationAnalyzer, ResourceLoad};
pub use metrics::{
    AggregateMetrics, EvmMetrics, EvmTotals, MetricCalculator, MetricValue, Outlook,
    PerformanceIndicator, TaskMetrics,
};
pub use risk::{RiskAggregator, RiskMatrix};
