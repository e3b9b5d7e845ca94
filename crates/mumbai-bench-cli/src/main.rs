use anyhow::Result;

mod cli;
mod commands;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; OLLAMA_HOST may come from the shell instead
    let _ = dotenvy::dotenv();
    cli::cli().await
}
