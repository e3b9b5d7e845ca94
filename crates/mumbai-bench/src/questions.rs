use crate::errors::{util::ensure_file_exists, BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One evaluation prompt in both of its language variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: u32,
    pub category: String,
    pub english: String,
    pub hindi: String,
}

#[derive(Debug, Deserialize)]
struct CategorizedItem {
    id: u32,
    text_en: String,
    text_hi: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionsFile {
    Flat(Vec<QuestionRecord>),
    Categorized {
        categorized_questions: Map<String, serde_json::Value>,
    },
}

/// Load the question list, preserving file order.
///
/// Accepts either a flat array of records or a `categorized_questions`
/// document keyed by category name.
pub fn load<P: AsRef<Path>>(path: P) -> BenchResult<Vec<QuestionRecord>> {
    let path = path.as_ref();
    ensure_file_exists(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| BenchError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let questions = parse(&content)
        .map_err(|e| BenchError::Config(format!("Invalid questions file {}: {}", path.display(), e)))?;
    tracing::info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

pub fn parse(content: &str) -> Result<Vec<QuestionRecord>, String> {
    let file: QuestionsFile = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let questions = match file {
        QuestionsFile::Flat(questions) => questions,
        QuestionsFile::Categorized {
            categorized_questions,
        } => {
            let mut questions = Vec::new();
            for (category, items) in categorized_questions {
                let items: Vec<CategorizedItem> = serde_json::from_value(items)
                    .map_err(|e| format!("category '{}': {}", category, e))?;
                questions.extend(items.into_iter().map(|item| QuestionRecord {
                    id: item.id,
                    category: category.clone(),
                    english: item.text_en,
                    hindi: item.text_hi,
                }));
            }
            questions
        }
    };

    let mut seen = HashSet::new();
    for question in &questions {
        if !seen.insert(question.id) {
            return Err(format!("duplicate question id {}", question.id));
        }
    }

    Ok(questions)
}

/// Warn when the loaded set differs from the size the run was configured for
pub fn check_expected_count(questions: &[QuestionRecord], expected: Option<usize>) -> bool {
    match expected {
        Some(expected) if expected != questions.len() => {
            tracing::warn!("Expected {} questions, found {}", expected, questions.len());
            false
        }
        _ => true,
    }
}
