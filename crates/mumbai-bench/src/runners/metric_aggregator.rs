use crate::config::AverageMode;
use crate::reporting::{ModelResultEntry, ModelSummary};

pub struct MetricAggregator;

impl MetricAggregator {
    /// Mean of `(score_en + score_hi) / 2` over the model's questions.
    ///
    /// With `AverageMode::AllQuestions` the denominator is `total_questions`,
    /// so failed questions pull the average down as if they scored zero.
    pub fn average_score(
        entries: &[ModelResultEntry],
        total_questions: usize,
        mode: AverageMode,
    ) -> f64 {
        let combined: Vec<f64> = entries.iter().filter_map(|e| e.combined_score()).collect();
        let denominator = match mode {
            AverageMode::AllQuestions => total_questions,
            AverageMode::AnsweredOnly => combined.len(),
        };
        if denominator == 0 {
            return 0.0;
        }
        combined.iter().sum::<f64>() / denominator as f64
    }

    pub fn summarize(
        entries: &[ModelResultEntry],
        total_questions: usize,
        mode: AverageMode,
        details_file: String,
    ) -> ModelSummary {
        ModelSummary {
            avg_score: Self::average_score(entries, total_questions, mode),
            total_questions,
            details_file,
            details_error: None,
        }
    }
}
