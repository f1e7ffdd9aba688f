use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use debater_core::documents;
use debater_core::config::BASE_URL_ENV;
use debater_core::{
    resolve_base_url, Config, DebateClient, GenerationOrchestrator, Resolution, TimelineEntry,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "debater")]
#[command(about = "Generate structured debates from your documents")]
#[command(version)]
struct Cli {
    /// Backend URL (overrides DEBATER_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a debate for a topic and print it
    Generate {
        /// Debate topic
        topic: String,
    },
    /// List documents known to the backend
    Documents,
    /// Upload PDF documents
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Rebuild the retrieval index from uploaded documents
    CreateDatabase,
    /// Check that the backend is reachable
    Ping,
}

const DEFAULT_FILTER: &str = "debater_core=debug,debater_tui=debug,warn";

/// The TUI owns the terminal, so its logs go to a file.
fn init_file_logging() -> Result<WorkerGuard> {
    let log_dir = std::env::var("DEBATER_LOG_DIR")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::cache_dir().map(|d| d.join("debater")))
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "debater.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!("logging to {}", log_dir.join("debater.log").display());
    Ok(guard)
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let base_url = resolve_base_url(
        cli.base_url.clone(),
        std::env::var(BASE_URL_ENV).ok(),
        &config,
    );
    let client = DebateClient::http(&base_url, config.policy());

    match cli.command {
        None => {
            let _guard = init_file_logging()?;
            info!(%base_url, "starting tui");
            run_tui(client).await
        }
        Some(command) => {
            init_stderr_logging();
            match command {
                Commands::Generate { topic } => generate(client, &topic).await,
                Commands::Documents => list_documents(client).await,
                Commands::Upload { files } => upload(client, &files).await,
                Commands::CreateDatabase => create_database(client).await,
                Commands::Ping => ping(client).await,
            }
        }
    }
}

async fn run_tui(client: DebateClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(client);
    app.start_refresh();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            let Some(event) = events.next().await else {
                break;
            };
            handler::handle_event(&mut app, event).await?;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn generate(client: DebateClient, topic: &str) -> Result<()> {
    let mut orchestrator = GenerationOrchestrator::new(client);
    let resolution = orchestrator.generate(topic).await?;

    match resolution {
        Resolution::Generated(id) => {
            if let Some(message) = orchestrator
                .timeline()
                .get(id)
                .and_then(TimelineEntry::as_conversation)
            {
                println!("{}", message.text);
            }
            Ok(())
        }
        Resolution::Failed(failure) => bail!("{}", failure.message),
    }
}

async fn list_documents(client: DebateClient) -> Result<()> {
    let documents = match client.documents().await {
        Ok(documents) => documents,
        Err(failure) => bail!("{}", failure.message),
    };

    if documents.is_empty() {
        println!("No documents uploaded yet");
        return Ok(());
    }
    for document in documents {
        println!("{}\t{} MB\t{}", document.name, document.size_mb(), document.kind);
    }
    Ok(())
}

async fn upload(client: DebateClient, paths: &[PathBuf]) -> Result<()> {
    let files = documents::load_upload_files(paths).await?;
    match documents::upload(&client, files).await {
        Some(Ok(receipt)) => {
            println!("{}", receipt.message);
            Ok(())
        }
        Some(Err(failure)) => bail!("{}", failure.message),
        None => Ok(()),
    }
}

async fn create_database(client: DebateClient) -> Result<()> {
    match client.create_database().await {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(failure) => bail!("{}", failure.message),
    }
}

async fn ping(client: DebateClient) -> Result<()> {
    match client.ping().await {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(failure) => bail!("{}", failure.message),
    }
}
