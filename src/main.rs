//! TAIF - Entry Point
//!
//! Interprets one natural language instruction (or a line-by-line
//! interactive session) and runs the matching file system operation.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use taif::command::{Agent, ComplexityAnalysis, ComplexityClassifier, ResolutionMode};
use taif::core::config::AgentConfig;
use taif::core::error::Result;
use tracing_subscriber::EnvFilter;

/// Natural language file system agent
#[derive(Parser, Debug)]
#[command(name = "taif")]
#[command(about = "Interpret and execute a natural language instruction")]
struct Args {
    /// Instruction to run; omit for an interactive session
    instruction: Vec<String>,

    /// Always use the thinker + formatter pair
    #[arg(long, alias = "dual-llm", conflicts_with = "single_stage")]
    dual_stage: bool,

    /// Always use a single structured pass
    #[arg(long)]
    single_stage: bool,

    /// Model for single-stage resolution
    #[arg(long)]
    model: Option<String>,

    /// Model for the analysis pass
    #[arg(long)]
    thinker_model: Option<String>,

    /// Model for the JSON pass
    #[arg(long)]
    formatter_model: Option<String>,

    /// Reasoning backend chat endpoint
    #[arg(long)]
    backend_url: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Complexity score that triggers the dual-stage path
    #[arg(long)]
    threshold: Option<u32>,

    /// Directory relative paths are resolved against
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the complexity breakdown without executing anything
    #[arg(long)]
    analyze_complexity: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "taif=debug" } else { "taif=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&args)?;
    let instruction = args.instruction.join(" ");

    if args.analyze_complexity {
        let analysis = ComplexityClassifier::from_config(&config).analyze(&instruction);
        print_analysis(&analysis);
        return Ok(());
    }

    let mode = if args.dual_stage {
        ResolutionMode::ForceDual
    } else if args.single_stage {
        ResolutionMode::ForceSingle
    } else {
        ResolutionMode::Auto
    };

    let agent = Agent::from_config(config)?.with_mode(mode);
    tracing::info!(
        backend = %agent.config().backend_url,
        actions = agent.registry().len(),
        "TAIF starting"
    );

    if instruction.trim().is_empty() {
        run_interactive(&agent)
    } else {
        println!("{}", agent.handle(&instruction).message());
        Ok(())
    }
}

/// Defaults, then config file, then environment, then flags
fn build_config(args: &Args) -> Result<AgentConfig> {
    let mut config = match &args.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    config.apply_env()?;

    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(model) = &args.thinker_model {
        config.thinker_model = model.clone();
    }
    if let Some(model) = &args.formatter_model {
        config.formatter_model = model.clone();
    }
    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(threshold) = args.threshold {
        config.complexity_threshold = threshold;
    }
    if let Some(dir) = &args.workdir {
        config.workdir = Some(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

fn print_analysis(analysis: &ComplexityAnalysis) {
    let indicators: Vec<String> = analysis.indicators.iter().map(|i| i.to_string()).collect();
    println!("\n=== Complexity Analysis ===");
    println!("Prompt: {}", analysis.prompt);
    println!("Word count: {}", analysis.word_count);
    println!("Complexity score: {}", analysis.score);
    println!("Threshold: {}", analysis.threshold);
    println!("Is complex: {}", analysis.is_complex);
    println!(
        "Indicators: {}",
        if indicators.is_empty() {
            "None".to_string()
        } else {
            indicators.join(", ")
        }
    );
    println!("Recommended approach: {}", analysis.recommended_approach());
}

fn run_interactive<S: taif::llm::ReasoningService>(agent: &Agent<S>) -> Result<()> {
    println!("\n=== TAIF ===");
    println!("Type an instruction, or 'quit' / 'q' to exit.");
    println!("Available actions: {}", agent.registry().list_actions().join(", "));
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        println!("{}", agent.handle(input).message());
    }

    Ok(())
}
