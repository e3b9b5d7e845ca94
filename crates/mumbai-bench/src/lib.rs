pub mod config;
pub mod errors;
pub mod pacing;
pub mod providers;
pub mod questions;
pub mod reporting;
pub mod runners;
pub mod scoring;

// Re-export main components for easier use
pub use config::{AverageMode, PromptStyle, RunConfig, RunMode};
pub use errors::{BenchError, BenchResult};
pub use questions::QuestionRecord;
pub use runners::{EvalRunner, RunOutcome};
pub use scoring::{HeuristicScorer, Scorer};
