use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One answered prompt: the text sent, the reply and how it scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub answer: String,
    pub time_sec: f64,
    pub chars: usize,
    pub score: u8,
}

impl AnswerRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, elapsed: Duration, score: u8) -> Self {
        let answer = answer.into();
        Self {
            question: question.into(),
            chars: answer.chars().count(),
            answer,
            time_sec: elapsed.as_secs_f64(),
            score,
        }
    }

    pub fn word_count(&self) -> usize {
        self.answer.split_whitespace().count()
    }
}

/// Per-question outcome for one model in batch mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelResultEntry {
    Answered {
        id: u32,
        category: String,
        english: AnswerRecord,
        hindi: AnswerRecord,
    },
    Failed {
        id: u32,
        error: String,
    },
}

impl ModelResultEntry {
    pub fn id(&self) -> u32 {
        match self {
            ModelResultEntry::Answered { id, .. } | ModelResultEntry::Failed { id, .. } => *id,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, ModelResultEntry::Answered { .. })
    }

    /// Mean of the two language scores, if both were answered
    pub fn combined_score(&self) -> Option<f64> {
        match self {
            ModelResultEntry::Answered { english, hindi, .. } => {
                Some((english.score as f64 + hindi.score as f64) / 2.0)
            }
            ModelResultEntry::Failed { .. } => None,
        }
    }
}

/// Per-question outcome in single mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResultEntry {
    pub id: u32,
    pub question: String,
    pub answer: String,
    pub timestamp: String,
}

impl SingleResultEntry {
    pub fn new(id: u32, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub avg_score: f64,
    pub total_questions: usize,
    pub details_file: String,
    /// Set when `details_file` could not be written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_error: Option<String>,
}

/// Consolidated report for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub models: BTreeMap<String, ModelSummary>,
}

impl FinalReport {
    pub fn new(start_time: DateTime<Local>) -> Self {
        Self {
            start_time,
            end_time: start_time,
            models: BTreeMap::new(),
        }
    }

    pub fn add_model(&mut self, model: impl Into<String>, summary: ModelSummary) {
        self.models.insert(model.into(), summary);
    }

    pub fn finish(&mut self) {
        self.end_time = Local::now();
    }

    /// One line per model, best average first
    pub fn summary(&self) -> String {
        let mut rows: Vec<_> = self.models.iter().collect();
        rows.sort_by(|a, b| b.1.avg_score.total_cmp(&a.1.avg_score));

        let mut out = format!(
            "Evaluated {} model(s) in {}s\n",
            self.models.len(),
            (self.end_time - self.start_time).num_seconds()
        );
        for (model, summary) in rows {
            let details = match &summary.details_error {
                Some(_) => format!("{} not written", summary.details_file),
                None => summary.details_file.clone(),
            };
            out.push_str(&format!(
                "  {:<24} avg {:>6.2} over {} questions ({})\n",
                model, summary.avg_score, summary.total_questions, details
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(score: u8) -> AnswerRecord {
        AnswerRecord::new("q", "a", Duration::from_millis(1500), score)
    }

    #[test]
    fn test_answer_record_metadata() {
        let record = AnswerRecord::new("Q", "मुंबई is big", Duration::from_millis(2500), 30);
        assert_eq!(record.chars, 12);
        assert_eq!(record.time_sec, 2.5);
        assert_eq!(record.word_count(), 3);
    }

    #[test]
    fn test_entry_shapes() {
        let failed = ModelResultEntry::Failed {
            id: 4,
            error: "Request timed out after 120s".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"id": 4, "error": "Request timed out after 120s"})
        );

        let answered = ModelResultEntry::Answered {
            id: 1,
            category: "food".to_string(),
            english: answer(70),
            hindi: answer(40),
        };
        let value = serde_json::to_value(&answered).unwrap();
        assert_eq!(value["english"]["score"], 70);
        assert_eq!(value["hindi"]["time_sec"], 1.5);
        assert_eq!(answered.combined_score(), Some(55.0));
        assert_eq!(failed.combined_score(), None);

        let back: ModelResultEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, answered);
        let back: ModelResultEntry =
            serde_json::from_value(json!({"id": 4, "error": "boom"})).unwrap();
        assert!(!back.is_answered());
        assert_eq!(back.id(), 4);
    }

    #[test]
    fn test_final_report_summary_orders_by_score() {
        let mut report = FinalReport::new(Local::now());
        report.add_model(
            "llama3",
            ModelSummary {
                avg_score: 41.5,
                total_questions: 3,
                details_file: "llama3_results.json".into(),
                details_error: Some("Is a directory".into()),
            },
        );
        report.add_model(
            "gemma",
            ModelSummary {
                avg_score: 62.0,
                total_questions: 3,
                details_file: "gemma_results.json".into(),
                details_error: None,
            },
        );
        report.finish();

        let summary = report.summary();
        let gemma = summary.find("gemma").unwrap();
        let llama = summary.find("llama3").unwrap();
        assert!(gemma < llama);
        assert!(summary.contains("llama3_results.json not written"));
        assert!(summary.contains("(gemma_results.json)"));

        let value = serde_json::to_value(&report).unwrap();
        assert!(value["models"]["gemma"].get("details_error").is_none());
        assert_eq!(value["models"]["llama3"]["details_error"], "Is a directory");
    }
}
