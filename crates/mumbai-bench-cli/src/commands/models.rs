use anyhow::{Context, Result};
use console::style;
use mumbai_bench::providers::{ChatProvider, OllamaProvider};
use mumbai_bench::RunConfig;

pub async fn handle_models(host: Option<String>) -> Result<()> {
    let config = RunConfig {
        host,
        ..Default::default()
    };
    let provider = OllamaProvider::new(&config.host())?;
    let models = provider
        .list_models()
        .await
        .with_context(|| format!("Could not reach Ollama at {}", provider.base_url()))?;

    if models.is_empty() {
        println!("No models installed. Pull one with `ollama pull <model>`.");
        return Ok(());
    }
    println!("{}", style("Installed models:").bold());
    for model in models {
        println!("  {}", model);
    }
    Ok(())
}
