pub mod eval_runner;
pub mod metric_aggregator;

pub use eval_runner::{BatchRunSummary, EvalRunner, ModelState, RunOutcome, SingleRunSummary};
pub use metric_aggregator::MetricAggregator;
