//! Operator subcommands: inspect which models the API key can reach.

use std::time::Duration;

use taskchat_core::{GeminiClient, LanguageModel};

/// Characters of each probe reply to print.
const PREVIEW_CHARS: usize = 50;

pub async fn list_models(client: &GeminiClient) -> anyhow::Result<()> {
    let models = client.list_models().await?;
    println!("Available models:");
    for model in &models {
        println!("- {}", model.name);
        println!(
            "  Supported operations: {}",
            model.supported_generation_methods.join(", ")
        );
    }
    Ok(())
}

/// Probe each model in turn. Fails only when every probe failed.
pub async fn probe_models(
    client: &GeminiClient,
    models: &[String],
    prompt: &str,
    timeout: Duration,
) -> anyhow::Result<()> {
    let targets: Vec<GeminiClient> = if models.is_empty() {
        vec![client.clone()]
    } else {
        models.iter().map(|m| client.with_model(m.as_str())).collect()
    };

    let mut ok = 0usize;
    for target in &targets {
        match tokio::time::timeout(timeout, target.generate("", prompt)).await {
            Ok(Ok(text)) => {
                ok += 1;
                println!("{} works: {}", target.model(), preview(&text));
            }
            Ok(Err(e)) => println!("Error with {}: {e}", target.model()),
            Err(_) => println!("Error with {}: timed out after {timeout:?}", target.model()),
        }
    }

    if ok == 0 {
        anyhow::bail!("all {} model probe(s) failed", targets.len());
    }
    Ok(())
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
