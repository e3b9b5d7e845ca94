use crate::errors::BenchResult;
use crate::questions::QuestionRecord;
use crate::reporting::store::model_file_stem;
use crate::reporting::types::ModelResultEntry;
use chrono::Local;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const CSV_HEADER: [&str; 10] = [
    "ID",
    "Category",
    "Question (EN)",
    "Question (HI)",
    "Model",
    "Response (EN)",
    "Response (HI)",
    "Tokens EN",
    "Tokens HI",
    "Timestamp",
];
const ERROR_CELL: &str = "ERROR";
/// Lets spreadsheet tools detect UTF-8 for the Devanagari columns
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Trait for secondary report formats derived from a model's results
pub trait ReportGenerator {
    fn generate(
        &self,
        model: &str,
        questions: &[QuestionRecord],
        entries: &[ModelResultEntry],
        output_dir: &Path,
    ) -> BenchResult<PathBuf>;
}

/// Spreadsheet-friendly export, one row per question
pub struct CsvReportGenerator;

impl ReportGenerator for CsvReportGenerator {
    fn generate(
        &self,
        model: &str,
        questions: &[QuestionRecord],
        entries: &[ModelResultEntry],
        output_dir: &Path,
    ) -> BenchResult<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{}_results.csv", model_file_stem(model)));

        let mut file = File::create(&path)?;
        file.write_all(UTF8_BOM)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(CSV_HEADER)?;

        let by_id: HashMap<u32, &QuestionRecord> = questions.iter().map(|q| (q.id, q)).collect();
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        for entry in entries {
            let (category, english_q, hindi_q) = match by_id.get(&entry.id()) {
                Some(q) => (q.category.as_str(), q.english.as_str(), q.hindi.as_str()),
                None => ("", "", ""),
            };

            let (response_en, response_hi, tokens_en, tokens_hi) = match entry {
                ModelResultEntry::Answered { english, hindi, .. } => (
                    english.answer.as_str(),
                    hindi.answer.as_str(),
                    english.word_count(),
                    hindi.word_count(),
                ),
                ModelResultEntry::Failed { .. } => (ERROR_CELL, ERROR_CELL, 0, 0),
            };

            writer.write_record([
                entry.id().to_string().as_str(),
                category,
                english_q,
                hindi_q,
                model,
                response_en,
                response_hi,
                tokens_en.to_string().as_str(),
                tokens_hi.to_string().as_str(),
                timestamp.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::types::AnswerRecord;
    use std::time::Duration;

    #[test]
    fn test_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let questions = vec![
            QuestionRecord {
                id: 1,
                category: "food".into(),
                english: "What is vada pav?".into(),
                hindi: "वड़ा पाव क्या है?".into(),
            },
            QuestionRecord {
                id: 2,
                category: "transport".into(),
                english: "How busy are local trains?".into(),
                hindi: "लोकल ट्रेन कितनी व्यस्त हैं?".into(),
            },
        ];
        let entries = vec![
            ModelResultEntry::Answered {
                id: 1,
                category: "food".into(),
                english: AnswerRecord::new("What is vada pav?", "A potato fritter, in a bun", Duration::ZERO, 50),
                hindi: AnswerRecord::new("वड़ा पाव क्या है?", "एक नाश्ता", Duration::ZERO, 30),
            },
            ModelResultEntry::Failed {
                id: 2,
                error: "Request timed out after 120s".into(),
            },
        ];

        let path = CsvReportGenerator
            .generate("llama3:8b", &questions, &entries, dir.path())
            .unwrap();
        assert!(path.ends_with("llama3_8b_results.csv"));

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][5], "A potato fritter, in a bun");
        assert_eq!(&rows[0][7], "6");
        assert_eq!(&rows[0][8], "2");
        assert_eq!(&rows[1][1], "transport");
        assert_eq!(&rows[1][5], "ERROR");
        assert_eq!(&rows[1][8], "0");
    }
}
