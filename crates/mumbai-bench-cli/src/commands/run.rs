use anyhow::{Context, Result};
use console::style;
use mumbai_bench::providers::{GenerationOptions, OllamaProvider};
use mumbai_bench::runners::RunOutcome;
use mumbai_bench::{EvalRunner, RunConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::cli::RunArgs;
use crate::logging::setup_logging;

/// Merge the optional config file with command line overrides
pub fn build_config(args: &RunArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    if let Some(questions) = &args.questions {
        config.questions_file = questions.clone();
    }
    if !args.models.is_empty() {
        config.models = args.models.clone();
    }
    if args.mode.is_some() {
        config.mode = args.mode;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if args.host.is_some() {
        config.host = args.host.clone();
    }
    if let Some(prompt_style) = args.prompt_style {
        config.prompt_style = prompt_style;
    }
    if let Some(average) = args.average {
        config.average = average;
    }
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }
    if args.question_delay.is_some() {
        config.question_delay_ms = args.question_delay;
    }
    if args.expect.is_some() {
        config.expected_questions = args.expect;
    }
    config.warm_up |= args.warm_up;
    config.csv |= args.csv;
    if args.reproducible {
        config.generation = GenerationOptions::reproducible();
    }

    config.validate()?;
    Ok(config)
}

pub async fn handle_run(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let _guard = setup_logging(Some(&config.output_dir))?;

    let host = config.host();
    let provider = OllamaProvider::new(&host)
        .with_context(|| format!("Invalid Ollama host '{}'", host))?;

    info!("{}", "=".repeat(60));
    info!(
        "Evaluating {} in {} mode against {}",
        config.models().join(", "),
        config.mode(),
        provider.base_url()
    );
    info!("{}", "=".repeat(60));

    let started = Instant::now();
    let runner = EvalRunner::new(config, Arc::new(provider));
    let outcome = runner.run().await?;
    let minutes = started.elapsed().as_secs_f64() / 60.0;

    match outcome {
        RunOutcome::Single(summary) => {
            println!(
                "{} {}: {} answered, {} failed",
                style("Done").green().bold(),
                summary.model,
                summary.answered,
                summary.failed
            );
            println!("Results saved to: {}", summary.results_file.display());
        }
        RunOutcome::Batch(summary) => {
            print!("{}", summary.report.summary());
            println!("Report saved to: {}", summary.report_file.display());
        }
    }
    info!("Evaluation completed in {:.2} minutes", minutes);

    Ok(())
}
