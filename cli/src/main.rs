//! `xicheng` command line: ask the corpus a question, run the offline
//! extraction batch, or list and dump the datasets on disk.
//!
//! Output is JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xc_ai::answer::answer;
use xc_ai::corpus::CorpusCache;
use xc_ai::llm::{ArkChatClient, OllamaLlm};
use xc_ai::ollama::OllamaClient;
use xc_ai::pipeline::BatchPipeline;
use xc_core::config::AppConfig;
use xc_core::dataset::{CsvDirSource, DatasetSource};

#[derive(Parser)]
#[command(name = "xicheng")]
#[command(about = "Xicheng history assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the historical corpus
    Ask {
        #[arg(required = true)]
        query: Vec<String>,
        /// Number of corpus records used as context
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Run structured extraction over datasets (all of them when none are named)
    Process { datasets: Vec<String> },

    /// List datasets in the data directory
    Files,

    /// Print one dataset's rows as JSON
    Data { name: String },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,xc_ai=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Ask { query, top_k } => ask(&config, &query.join(" "), top_k),
        Commands::Process { datasets } => process(&config, &datasets),
        Commands::Files => files(&config),
        Commands::Data { name } => data(&config, &name),
    }
}

fn ask(config: &AppConfig, query: &str, top_k: Option<usize>) -> Result<()> {
    let corpus = CorpusCache::new(Box::new(CsvDirSource::open(config.data_dir.clone())));
    let chat = ArkChatClient::new(&config.ark_base_url, config.ark_api_key.clone())
        .with_timeout(config.ark_timeout);

    let envelope = answer(
        &corpus,
        &chat,
        &config.ark_model,
        query,
        top_k.unwrap_or(config.top_k),
    );
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn process(config: &AppConfig, datasets: &[String]) -> Result<()> {
    let source = CsvDirSource::open(config.data_dir.clone());
    let client = OllamaClient::new(&config.ollama_base_url)?;
    // Rows are marked failed individually if Ollama stays down.
    client.is_healthy();
    let llm = OllamaLlm::new(client).with_timeout(config.ollama_timeout);

    let summary = BatchPipeline::new(&source, &llm, &config.ollama_model, config.processed_dir.clone())
        .with_row_delay(config.row_delay)
        .run(datasets)?;
    tracing::info!(
        written = summary.datasets.iter().filter(|r| r.written).count(),
        failed = summary.failures.len(),
        "batch finished"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn files(config: &AppConfig) -> Result<()> {
    let source = CsvDirSource::open(config.data_dir.clone());
    let names = source.list_datasets()?;
    println!("{}", serde_json::to_string_pretty(&names)?);
    Ok(())
}

fn data(config: &AppConfig, name: &str) -> Result<()> {
    let source = CsvDirSource::open(config.data_dir.clone());
    let dataset = source
        .require_dataset(name)
        .with_context(|| format!("Cannot read dataset '{name}' from {}", source.root().display()))?;
    println!("{}", serde_json::to_string_pretty(&dataset.rows)?);
    Ok(())
}
