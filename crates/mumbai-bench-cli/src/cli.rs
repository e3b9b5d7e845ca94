use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mumbai_bench::{AverageMode, PromptStyle, RunMode};
use std::path::PathBuf;

use crate::commands::models::handle_models;
use crate::commands::run::handle_run;
use crate::commands::score::handle_score;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "TOML run configuration",
        long_help = "Load run settings from a TOML file. Flags given on the command line override values from the file."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Questions file (default: questions.json)"
    )]
    pub questions: Option<PathBuf>,

    #[arg(
        short,
        long = "model",
        value_name = "MODEL",
        action = clap::ArgAction::Append,
        value_delimiter = ',',
        help = "Model to evaluate (e.g., 'falcon:7b-instruct', 'llama3')",
        long_help = "Model to evaluate. Repeat the flag or pass a comma-separated list to evaluate several models in priority order."
    )]
    pub models: Vec<String>,

    #[arg(
        long,
        value_name = "MODE",
        help = "Run mode (single, batch)",
        long_help = "single: one model, English only, results.json rewritten after every answer. batch: English and Hindi, scored, one file per model plus final_report.json. Defaults to single for one model and batch for several."
    )]
    pub mode: Option<RunMode>,

    #[arg(short, long, value_name = "DIR", help = "Directory for result files (default: results)")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "URL", help = "Ollama host (overrides OLLAMA_HOST)")]
    pub host: Option<String>,

    #[arg(long, value_name = "STYLE", help = "Prompt style (raw, instructed)")]
    pub prompt_style: Option<PromptStyle>,

    #[arg(
        long,
        value_name = "DENOMINATOR",
        help = "Average score denominator (all_questions, answered_only)"
    )]
    pub average: Option<AverageMode>,

    #[arg(long, value_name = "SECS", help = "Per-call timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "MS", help = "Pause after each question in milliseconds")]
    pub question_delay: Option<u64>,

    #[arg(long, value_name = "N", help = "Warn when the question count differs from N")]
    pub expect: Option<usize>,

    #[arg(long, help = "Load each model with a short prompt before asking questions")]
    pub warm_up: bool,

    #[arg(long, help = "Also write a CSV per model (batch mode)")]
    pub csv: bool,

    #[arg(long, help = "Use fixed sampling settings (temperature 0.3, seed 42, ...)")]
    pub reproducible: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one or more models on the question set
    #[command(about = "Evaluate one or more models on the question set")]
    Run(RunArgs),

    /// List models installed on the chat service
    #[command(about = "List models installed on the chat service")]
    Models {
        #[arg(long, value_name = "URL", help = "Ollama host (overrides OLLAMA_HOST)")]
        host: Option<String>,
    },

    /// Score an answer with the heuristic scorer
    #[command(about = "Score an answer with the heuristic scorer")]
    Score {
        #[arg(short = 'i', long = "question-id", value_name = "ID", default_value = "0")]
        question_id: u32,

        #[arg(value_name = "TEXT", help = "Answer text, or '-' to read stdin")]
        text: String,
    },
}

pub async fn cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run(args)) => handle_run(args).await,
        Some(Command::Models { host }) => handle_models(host).await,
        Some(Command::Score { question_id, text }) => handle_score(question_id, &text),
        None => handle_run(RunArgs::default()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "mumbai-bench",
            "run",
            "--model",
            "llama3,mistral",
            "-m",
            "gemma:7b",
            "--mode",
            "batch",
            "--prompt-style",
            "instructed",
            "--csv",
        ])
        .unwrap();

        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.models, vec!["llama3", "mistral", "gemma:7b"]);
        assert_eq!(args.mode, Some(RunMode::Batch));
        assert_eq!(args.prompt_style, Some(PromptStyle::Instructed));
        assert!(args.csv);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["mumbai-bench", "run", "--mode", "parallel"]).is_err());
    }
}
