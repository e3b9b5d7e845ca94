use crate::config::{RunConfig, RunMode};
use crate::errors::{BenchError, BenchResult};
use crate::pacing::Pacer;
use crate::providers::{ChatProvider, GenerationOptions, ProviderError};
use crate::questions::{self, QuestionRecord};
use crate::reporting::{
    model_results_file, AnswerRecord, CsvReportGenerator, FinalReport, ModelResultEntry,
    ReportGenerator, ResultStore, SingleResultEntry, FINAL_REPORT_FILE, SINGLE_RESULTS_FILE,
};
use crate::runners::metric_aggregator::MetricAggregator;
use crate::scoring::{HeuristicScorer, Scorer};
use chrono::Local;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const WARM_UP_PROMPT: &str = "What is Mumbai famous for? Answer in one sentence.";
const WARM_UP_NUM_PREDICT: i32 = 20;
const WARM_UP_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Lifecycle of one model within a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Pending,
    CheckingAvailability,
    Skipped(String),
    Running,
    Done,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Pending => write!(f, "pending"),
            ModelState::CheckingAvailability => write!(f, "checking availability"),
            ModelState::Skipped(reason) => write!(f, "skipped ({})", reason),
            ModelState::Running => write!(f, "running"),
            ModelState::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SingleRunSummary {
    pub model: String,
    pub answered: usize,
    pub failed: usize,
    pub results_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BatchRunSummary {
    pub report: FinalReport,
    pub report_file: PathBuf,
    pub states: Vec<(String, ModelState)>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Single(SingleRunSummary),
    Batch(BatchRunSummary),
}

/// Runs the question set against one or more models.
///
/// A single model list and a batch list share the same loop; the mode decides
/// which language variants are asked, how answers are recorded and when
/// results are persisted.
pub struct EvalRunner {
    config: RunConfig,
    provider: Arc<dyn ChatProvider>,
    scorer: Arc<dyn Scorer>,
    store: ResultStore,
    pacer: Pacer,
    warm_up_delay: Duration,
}

impl EvalRunner {
    pub fn new(config: RunConfig, provider: Arc<dyn ChatProvider>) -> Self {
        let store = ResultStore::new(config.output_dir.clone());
        let pacer = config.pacer();
        Self {
            config,
            provider,
            scorer: Arc::new(HeuristicScorer::default()),
            store,
            pacer,
            warm_up_delay: WARM_UP_RETRY_DELAY,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_warm_up_delay(mut self, delay: Duration) -> Self {
        self.warm_up_delay = delay;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Load the configured questions file and evaluate every model
    pub async fn run(&self) -> BenchResult<RunOutcome> {
        self.config.validate()?;
        let questions = questions::load(&self.config.questions_file)?;
        questions::check_expected_count(&questions, self.config.expected_questions);
        self.run_questions(&questions).await
    }

    pub async fn run_questions(&self, questions: &[QuestionRecord]) -> BenchResult<RunOutcome> {
        let mode = self.config.mode();
        info!(
            "Starting {} run over {} questions (output: {})",
            mode,
            questions.len(),
            self.store.dir().display()
        );
        match mode {
            RunMode::Single => self.run_single(questions).await.map(RunOutcome::Single),
            RunMode::Batch => self.run_batch(questions).await.map(RunOutcome::Batch),
        }
    }

    async fn run_single(&self, questions: &[QuestionRecord]) -> BenchResult<SingleRunSummary> {
        let model = self
            .config
            .models()
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::Config("No model specified".to_string()))?;

        // Startup connectivity check; nothing useful can happen without it
        let installed = self
            .provider
            .list_models()
            .await
            .map_err(|e| BenchError::Unavailable(e.to_string()))?;
        if !installed.iter().any(|name| name.starts_with(&model)) {
            warn!("{} is not among the installed models, calls will likely fail", model);
        }

        if self.config.warm_up && !self.warm_up(&model).await {
            return Err(BenchError::ModelUnavailable(format!(
                "{} could not be loaded",
                model
            )));
        }

        let mut results: Vec<SingleResultEntry> = Vec::new();
        let results_file = self.store.write(SINGLE_RESULTS_FILE, &results)?;
        let mut failed = 0;

        for (index, question) in questions.iter().enumerate() {
            info!("[{}/{}] {} question {}", index + 1, questions.len(), model, question.id);
            let prompt = self.config.prompt_style.english(&question.english);

            match self
                .provider
                .complete(&model, &prompt, &self.config.generation, self.config.timeout())
                .await
            {
                Ok(response) => {
                    debug!(
                        "Question {} answered in {:.2}s",
                        question.id,
                        response.elapsed.as_secs_f64()
                    );
                    results.push(SingleResultEntry::new(
                        question.id,
                        question.english.clone(),
                        response.text,
                    ));
                    self.store.write(SINGLE_RESULTS_FILE, &results)?;
                }
                Err(e) => {
                    failed += 1;
                    error!("Question {} failed for {}: {}", question.id, model, e);
                }
            }

            self.pacer.after_question().await;
        }

        info!(
            "{}: {} answered, {} failed, results in {}",
            model,
            results.len(),
            failed,
            results_file.display()
        );

        Ok(SingleRunSummary {
            model,
            answered: results.len(),
            failed,
            results_file,
        })
    }

    async fn run_batch(&self, questions: &[QuestionRecord]) -> BenchResult<BatchRunSummary> {
        let mut report = FinalReport::new(Local::now());
        let mut states: Vec<(String, ModelState)> = self
            .config
            .models()
            .into_iter()
            .map(|m| (m, ModelState::Pending))
            .collect();

        for slot in states.iter_mut() {
            let model = slot.0.clone();
            set_state(slot, ModelState::CheckingAvailability);

            if let Some(reason) = self.unavailable_reason(&model).await {
                warn!("Skipping {}: {}", model, reason);
                set_state(slot, ModelState::Skipped(reason));
                continue;
            }

            set_state(slot, ModelState::Running);
            let entries = self.evaluate_model(&model, questions).await;

            let details_file = model_results_file(&model);
            let details_error = match self.store.write(&details_file, &entries) {
                Ok(path) => {
                    info!("Wrote {} results to {}", model, path.display());
                    None
                }
                Err(e) => {
                    error!("Failed to write results for {}: {}", model, e);
                    Some(e.to_string())
                }
            };

            if self.config.csv {
                if let Err(e) =
                    CsvReportGenerator.generate(&model, questions, &entries, self.store.dir())
                {
                    error!("Failed to write CSV for {}: {}", model, e);
                }
            }

            let mut summary = MetricAggregator::summarize(
                &entries,
                questions.len(),
                self.config.average,
                details_file,
            );
            summary.details_error = details_error;
            info!("{} average score: {:.2}", model, summary.avg_score);
            report.add_model(model, summary);
            set_state(slot, ModelState::Done);
        }

        report.finish();
        let report_file = self.store.write(FINAL_REPORT_FILE, &report)?;
        info!("Final report written to {}", report_file.display());

        Ok(BatchRunSummary {
            report,
            report_file,
            states,
        })
    }

    /// Reason a model cannot run, if any
    async fn unavailable_reason(&self, model: &str) -> Option<String> {
        match self.provider.is_available(model).await {
            Ok(true) => {}
            Ok(false) => return Some("not installed".to_string()),
            Err(e) => return Some(format!("availability check failed: {}", e)),
        }
        if self.config.warm_up && !self.warm_up(model).await {
            return Some("warm-up failed".to_string());
        }
        None
    }

    async fn evaluate_model(&self, model: &str, questions: &[QuestionRecord]) -> Vec<ModelResultEntry> {
        let mut entries = Vec::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            info!("[{}/{}] {} question {}", index + 1, questions.len(), model, question.id);
            let entry = match self.ask_both_languages(model, question).await {
                Ok((english, hindi)) => ModelResultEntry::Answered {
                    id: question.id,
                    category: question.category.clone(),
                    english,
                    hindi,
                },
                Err(e) => {
                    error!("Question {} failed for {}: {}", question.id, model, e);
                    ModelResultEntry::Failed {
                        id: question.id,
                        error: e.to_string(),
                    }
                }
            };
            entries.push(entry);

            self.pacer.after_question().await;
        }

        entries
    }

    async fn ask_both_languages(
        &self,
        model: &str,
        question: &QuestionRecord,
    ) -> Result<(AnswerRecord, AnswerRecord), ProviderError> {
        let style = self.config.prompt_style;
        let english = self
            .ask(model, question.id, &question.english, &style.english(&question.english))
            .await?;
        self.pacer.between_language_variants().await;
        let hindi = self
            .ask(model, question.id, &question.hindi, &style.hindi(&question.hindi))
            .await?;
        Ok((english, hindi))
    }

    async fn ask(
        &self,
        model: &str,
        question_id: u32,
        question: &str,
        prompt: &str,
    ) -> Result<AnswerRecord, ProviderError> {
        let response = self
            .provider
            .complete(model, prompt, &self.config.generation, self.config.timeout())
            .await?;
        let score = self.scorer.score(&response.text, question_id);
        Ok(AnswerRecord::new(question, response.text, response.elapsed, score))
    }

    /// Load the model with a short prompt, trying up to the configured number
    /// of attempts.
    async fn warm_up(&self, model: &str) -> bool {
        let attempts = self.config.warm_up_attempts;
        let options: GenerationOptions = self
            .config
            .generation
            .clone()
            .with_num_predict(WARM_UP_NUM_PREDICT);

        for attempt in 1..=attempts {
            match self
                .provider
                .complete(model, WARM_UP_PROMPT, &options, self.config.timeout())
                .await
            {
                Ok(response) if !response.text.trim().is_empty() => {
                    let preview: String = response.text.chars().take(50).collect();
                    info!("{} warm-up successful. Response: {}...", model, preview);
                    return true;
                }
                Ok(_) => warn!("{} warm-up returned an empty response ({}/{})", model, attempt, attempts),
                Err(e) => warn!("{} warm-up failed ({}/{}): {}", model, attempt, attempts, e),
            }
            if attempt < attempts && !self.warm_up_delay.is_zero() {
                tokio::time::sleep(self.warm_up_delay).await;
            }
        }
        false
    }
}

fn set_state(slot: &mut (String, ModelState), next: ModelState) {
    debug!("{}: {} -> {}", slot.0, slot.1, next);
    slot.1 = next;
}
