pub mod report_generators;
pub mod store;
pub mod types;

pub use report_generators::{CsvReportGenerator, ReportGenerator};
pub use store::{model_results_file, ResultStore, FINAL_REPORT_FILE, SINGLE_RESULTS_FILE};
pub use types::{AnswerRecord, FinalReport, ModelResultEntry, ModelSummary, SingleResultEntry};
