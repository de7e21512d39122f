use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planner::agents::{Prediction, PredictionClient, PredictionInput, QueryRouter};
use planner::models::{AgentSession, PlannerConfig, RouteMode};
use planner::report::ForecastStore;
use planner::{render_content, ChatSession, ForecastReport, Rendered};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "planner", about = "Housing forecast planning assistant")]
struct Cli {
    /// Path to configuration file. Defaults are used when it does not exist.
    #[arg(short, long, default_value = "config/planner.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat, one turn per line. `/mode <direct|knowledge>` switches backend, `/quit` exits.
    Chat {
        #[arg(short, long)]
        mode: Option<RouteMode>,
    },
    /// Ask a single question.
    Ask {
        query: String,
        #[arg(short, long)]
        mode: Option<RouteMode>,
    },
    /// Build the forecast report (.xlsx when the output path ends in `.xlsx`, JSON otherwise).
    Report {
        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Send a payload (JSON or plain text) to the prediction endpoint.
    Predict { payload: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Chat { mode } => chat(&config, mode).await,
        Command::Ask { query, mode } => ask(&config, &query, mode).await,
        Command::Report { pretty, output } => report(&config, pretty, output.as_deref()),
        Command::Predict { payload } => predict(&config, payload).await,
    }
}

fn load_config(path: &str) -> Result<PlannerConfig> {
    if !Path::new(path).exists() {
        info!(path, "Config file not found, using defaults");
        return Ok(PlannerConfig::default());
    }
    let config_str =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    toml::from_str(&config_str).with_context(|| format!("Failed to parse config: {path}"))
}

fn new_chat(config: &PlannerConfig, mode: Option<RouteMode>) -> ChatSession {
    ChatSession::new(
        AgentSession::generate(&config.agent.session_prefix),
        mode.unwrap_or(config.backends.default_mode),
    )
}

fn print_rendered(content: &str) {
    match render_content(content) {
        Rendered::Table(table) => println!("{}", table.to_text()),
        Rendered::Text(text) => println!("{text}"),
    }
}

async fn chat(config: &PlannerConfig, mode: Option<RouteMode>) -> Result<()> {
    let router = planner::build_router(config).context("Failed to build router")?;
    let store = planner::build_store(&config.report).context("Failed to open forecast")?;
    let mut session = new_chat(config, mode);
    info!(session = %session.agent_session().id, mode = %session.mode(), "Chat started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if let Some(mode) = line.strip_prefix("/mode") {
            match mode.parse::<RouteMode>() {
                Ok(mode) => session.set_mode(mode),
                Err(e) => eprintln!("{e}"),
            }
            continue;
        }

        run_turn(&router, &mut session, line).await;
        if config.report.regenerate_each_turn {
            regenerate(store.as_ref(), &config.report.output_path);
        }
    }
    Ok(())
}

async fn run_turn(router: &QueryRouter, session: &mut ChatSession, query: &str) {
    let outcome = session.handle_turn(router, query).await;
    if outcome.result.is_error() {
        eprintln!("{}", outcome.display);
    } else {
        print_rendered(&outcome.display);
    }
}

/// Rebuild the report file. Failures are logged and the chat continues.
fn regenerate(store: &dyn ForecastStore, path: &str) {
    if let Err(e) = ForecastReport::from_store(store).write_to(path, true) {
        warn!(path, error = %e, "Failed to regenerate report");
    }
}

async fn ask(config: &PlannerConfig, query: &str, mode: Option<RouteMode>) -> Result<()> {
    let router = planner::build_router(config).context("Failed to build router")?;
    let mut session = new_chat(config, mode);
    let outcome = session.handle_turn(&router, query).await;
    if outcome.result.is_error() {
        anyhow::bail!("{}", outcome.display);
    }
    print_rendered(&outcome.display);
    Ok(())
}

fn report(config: &PlannerConfig, pretty: bool, output: Option<&str>) -> Result<()> {
    let store = planner::build_store(&config.report).context("Failed to open forecast")?;
    let report = ForecastReport::from_store(store.as_ref());
    match output {
        Some(path) => report
            .write_to(path, pretty)
            .with_context(|| format!("Failed to write report: {path}"))?,
        None => println!("{}", report.to_json(pretty)?),
    }
    Ok(())
}

async fn predict(config: &PlannerConfig, payload: String) -> Result<()> {
    let prediction_config = config
        .prediction
        .as_ref()
        .context("No [prediction] section in config")?;
    let client = PredictionClient::new(prediction_config)
        .context("Failed to build prediction client")?;

    let input = match serde_json::from_str(&payload) {
        Ok(value) => PredictionInput::Json(value),
        Err(_) => PredictionInput::Text(payload),
    };

    match client.invoke(input).await {
        Some(Prediction::Json(value)) => println!("{}", serde_json::to_string_pretty(&value)?),
        Some(Prediction::Text(text)) => println!("{text}"),
        None => anyhow::bail!("Prediction request failed"),
    }
    Ok(())
}
