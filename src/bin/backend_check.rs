//! Reasoning backend check
//!
//! Confirms the configured backend answers and lists the models it serves.

use clap::Parser;
use taif::core::config::AgentConfig;
use taif::llm::ReasoningClient;

#[derive(Parser, Debug)]
#[command(name = "taif-backend-check")]
#[command(about = "Check that the reasoning backend is reachable and list its models")]
struct Args {
    /// Backend chat endpoint (defaults to config/env)
    #[arg(long)]
    backend_url: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = AgentConfig::default();
    config.apply_env()?;
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }
    config.timeout_secs = args.timeout;

    let client = ReasoningClient::from_config(&config)?;
    match client.list_models().await {
        Ok(models) => {
            println!("Backend is running at {}", client.api_url());
            println!("Available models:");
            for model in &models {
                println!("- {}", model);
            }
            for wanted in [&config.model, &config.thinker_model, &config.formatter_model] {
                if !models.iter().any(|m| m == wanted || m.starts_with(&format!("{}:", wanted))) {
                    println!("warning: configured model '{}' not found", wanted);
                }
            }
        }
        Err(e) => {
            println!("Could not connect to backend at {}", client.api_url());
            println!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
