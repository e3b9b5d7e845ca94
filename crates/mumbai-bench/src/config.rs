use crate::errors::{BenchError, BenchResult};
use crate::pacing::Pacer;
use crate::providers::ollama::OLLAMA_HOST;
use crate::providers::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SINGLE_MODEL: &str = "falcon:7b-instruct";
/// Batch models in priority order
pub const DEFAULT_BATCH_MODELS: &[&str] = &[
    "llama3:8b",
    "mistral:7b",
    "gemma:7b",
    "falcon:7b-instruct",
];
pub const DEFAULT_QUESTIONS_FILE: &str = "questions.json";
pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_WARM_UP_ATTEMPTS: u32 = 3;

/// How a run iterates and persists.
///
/// `Single` asks each question once in English and rewrites `results.json`
/// after every answer. `Batch` asks both language variants, scores them and
/// writes one file per model plus a final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Single,
    Batch,
}

impl RunMode {
    pub fn default_timeout(&self) -> Duration {
        match self {
            RunMode::Single => Duration::from_secs(30),
            RunMode::Batch => Duration::from_secs(120),
        }
    }

    pub fn default_pacer(&self) -> Pacer {
        match self {
            RunMode::Single => Pacer::new(Duration::from_millis(2000), Duration::ZERO),
            RunMode::Batch => Pacer::new(Duration::from_millis(1500), Duration::from_millis(1000)),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Single => write!(f, "single"),
            RunMode::Batch => write!(f, "batch"),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(RunMode::Single),
            "batch" => Ok(RunMode::Batch),
            other => Err(format!("unknown run mode '{}'", other)),
        }
    }
}

/// Whether questions are sent verbatim or wrapped in answering instructions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    #[default]
    Raw,
    Instructed,
}

impl PromptStyle {
    pub fn english(&self, question: &str) -> String {
        match self {
            PromptStyle::Raw => question.to_string(),
            PromptStyle::Instructed => format!(
                "Please answer the following question in English.\nBe concise and accurate in your response.\nQuestion: {}",
                question
            ),
        }
    }

    pub fn hindi(&self, question: &str) -> String {
        match self {
            PromptStyle::Raw => question.to_string(),
            PromptStyle::Instructed => format!(
                "कृपया निम्नलिखित प्रश्न का उत्तर हिंदी में दें।\nउत्तर संक्षिप्त और सटीक दें।\nप्रश्न: {}",
                question
            ),
        }
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(PromptStyle::Raw),
            "instructed" => Ok(PromptStyle::Instructed),
            other => Err(format!("unknown prompt style '{}'", other)),
        }
    }
}

/// Denominator used for a model's average score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageMode {
    /// Every question counts, failed ones contribute zero
    #[default]
    AllQuestions,
    /// Only questions that produced both answers count
    AnsweredOnly,
}

impl FromStr for AverageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "all_questions" => Ok(AverageMode::AllQuestions),
            "answered_only" => Ok(AverageMode::AnsweredOnly),
            other => Err(format!("unknown average mode '{}'", other)),
        }
    }
}

/// Settings for one evaluation run, read from TOML and then overridden from
/// the environment and command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub host: Option<String>,
    pub models: Vec<String>,
    pub mode: Option<RunMode>,
    pub questions_file: PathBuf,
    pub output_dir: PathBuf,
    pub expected_questions: Option<usize>,
    pub prompt_style: PromptStyle,
    pub warm_up: bool,
    pub warm_up_attempts: u32,
    pub timeout_secs: Option<u64>,
    pub question_delay_ms: Option<u64>,
    pub language_delay_ms: Option<u64>,
    pub csv: bool,
    pub average: AverageMode,
    pub generation: GenerationOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            host: None,
            models: Vec::new(),
            mode: None,
            questions_file: PathBuf::from(DEFAULT_QUESTIONS_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            expected_questions: None,
            prompt_style: PromptStyle::default(),
            warm_up: false,
            warm_up_attempts: DEFAULT_WARM_UP_ATTEMPTS,
            timeout_secs: None,
            question_delay_ms: None,
            language_delay_ms: None,
            csv: false,
            average: AverageMode::default(),
            generation: GenerationOptions::default(),
        }
    }
}

impl RunConfig {
    pub fn from_string(config_str: &str) -> BenchResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| BenchError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_string(&content)
    }

    /// Explicit mode, otherwise single for one model and batch for several
    pub fn mode(&self) -> RunMode {
        self.mode.unwrap_or(if self.models.len() > 1 {
            RunMode::Batch
        } else {
            RunMode::Single
        })
    }

    /// Configured models, or the defaults for the resolved mode
    pub fn models(&self) -> Vec<String> {
        if !self.models.is_empty() {
            return self.models.clone();
        }
        match self.mode() {
            RunMode::Single => vec![DEFAULT_SINGLE_MODEL.to_string()],
            RunMode::Batch => DEFAULT_BATCH_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Configured host, then `OLLAMA_HOST`, then localhost
    pub fn host(&self) -> String {
        self.host
            .clone()
            .or_else(|| std::env::var("OLLAMA_HOST").ok())
            .unwrap_or_else(|| OLLAMA_HOST.to_string())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.mode().default_timeout())
    }

    pub fn pacer(&self) -> Pacer {
        let defaults = self.mode().default_pacer();
        Pacer::new(
            self.question_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.between_questions()),
            self.language_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.between_languages()),
        )
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err(BenchError::Config("Model names must not be empty".to_string()));
        }
        if self.mode == Some(RunMode::Single) && self.models.len() > 1 {
            return Err(BenchError::Config(format!(
                "Single mode evaluates one model, got {}",
                self.models.len()
            )));
        }
        if self.warm_up && self.warm_up_attempts == 0 {
            return Err(BenchError::Config(
                "warm_up_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
