use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use storage::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker::{
    NameNormalizer, Outcome, SystemClock, TrackerConfig, WorkoutTracker,
    canonical::validator::RecordValidator,
    config::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_TIMEOUT_SECS},
    extractors::{ExtractionPromptBuilder, LogExtractor, OllamaClient},
};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Workout log tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_OLLAMA_MODEL)]
    model: String,

    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// JSON object mapping spellings to canonical exercise names
    #[arg(long, env = "EXERCISE_DICTIONARY")]
    dictionary: Option<PathBuf>,

    #[arg(short, long, global = true, env = "TRACKER_USER", default_value = "default")]
    user: String,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a free-text workout
    Log {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Parse a workout without saving it
    Preview {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List recent logs
    Logs {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    Routine {
        #[command(subcommand)]
        action: RoutineCommand,
    },
    /// Today's planned exercises and which are done
    Today,
    /// Delete every log recorded today
    ResetToday,
    /// Print the extraction prompt for a text
    Prompt {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Check the model server and the configured model
    Check,
}

#[derive(Subcommand)]
enum RoutineCommand {
    Show,
    /// Replace the routine with a `{"1": ["press banca", ...], ...}` JSON file
    Save { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tracker={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = TrackerConfig {
        database_url: cli.database_url.clone(),
        ollama_url: cli.ollama_url.clone(),
        ollama_model: cli.model.clone(),
        request_timeout: Duration::from_secs(cli.timeout_secs),
        dictionary_path: cli.dictionary.clone(),
    };
    let user = cli.user.as_str();

    match cli.command {
        Commands::Prompt { text } => {
            println!("{}", ExtractionPromptBuilder::new().build_prompt(&text.join(" ")));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preview { text } => handle_preview(&config, &text.join(" ")).await,
        Commands::Check => handle_check(&config).await,
        Commands::Log { text } => {
            let tracker = connect(&config).await?;
            print_outcome(&tracker.submit_log(user, &text.join(" ")).await)
        }
        Commands::Logs { days } => {
            let tracker = connect(&config).await?;
            print_outcome(&tracker.get_logs(user, days).await)
        }
        Commands::Routine { action } => {
            let tracker = connect(&config).await?;
            match action {
                RoutineCommand::Show => print_outcome(&tracker.get_routine(user).await),
                RoutineCommand::Save { file } => {
                    tracing::info!("Loading routine from: {}", file.display());
                    let json = tokio::fs::read_to_string(&file)
                        .await
                        .with_context(|| format!("cannot read {}", file.display()))?;
                    let routine: serde_json::Value = serde_json::from_str(&json)
                        .with_context(|| format!("{} is not valid JSON", file.display()))?;
                    print_outcome(&tracker.save_routine(user, &routine).await)
                }
            }
        }
        Commands::Today => {
            let tracker = connect(&config).await?;
            print_outcome(&tracker.get_today_status(user).await)
        }
        Commands::ResetToday => {
            let tracker = connect(&config).await?;
            print_outcome(&tracker.reset_today(user).await)
        }
    }
}

fn ollama_client(config: &TrackerConfig) -> anyhow::Result<OllamaClient> {
    OllamaClient::new(
        &config.ollama_url,
        &config.ollama_model,
        config.request_timeout,
    )
    .context("failed to build the model client")
}

async fn connect(config: &TrackerConfig) -> anyhow::Result<WorkoutTracker<OllamaClient, Database>> {
    let dictionary = config.load_dictionary()?;

    tracing::info!("Connecting to database...");
    let database = Database::new(config.database_url()?)
        .await
        .context("failed to connect to the database")?;
    database
        .run_migrations()
        .await
        .context("failed to run migrations")?;

    Ok(WorkoutTracker::new(
        Arc::new(ollama_client(config)?),
        Arc::new(database),
        Arc::new(dictionary),
        Arc::new(SystemClock),
    ))
}

async fn handle_preview(config: &TrackerConfig, text: &str) -> anyhow::Result<ExitCode> {
    let normalizer = NameNormalizer::new(Arc::new(config.load_dictionary()?));
    let extractor = LogExtractor::new(
        Arc::new(ollama_client(config)?),
        ExtractionPromptBuilder::new(),
        RecordValidator::new(normalizer),
    );

    let outcome = match extractor.extract(text).await {
        Ok(validated) => Outcome::ok(
            format!("Parsed {} exercise(s)", validated.entries.len()),
            validated.entries,
        ),
        Err(e) => {
            tracing::error!("preview failed: {}", e);
            Outcome::failure(e.to_string())
        }
    };
    print_outcome(&outcome)
}

async fn handle_check(config: &TrackerConfig) -> anyhow::Result<ExitCode> {
    let client = ollama_client(config)?;

    if !client.health_check().await.unwrap_or(false) {
        tracing::error!("Model server at {} is not reachable", config.ollama_url);
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!("✓ Model server reachable at {}", config.ollama_url);

    if !client.verify_model().await? {
        tracing::error!(
            "Model '{}' is not available; pull it with: ollama pull {}",
            client.model(),
            client.model()
        );
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!("✓ Model '{}' available", client.model());

    Ok(ExitCode::SUCCESS)
}

fn print_outcome<T: Serialize>(outcome: &Outcome<T>) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
