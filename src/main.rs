use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pelot_core::bootstrap::{AppBuilder, resolve_config_path};
use pelot_core::{Assistant, AssistantError};
use pelot_gateway::GatewayServer;

#[derive(Debug, Parser)]
#[command(name = "pelot", version, about = "Ask questions about a folder of PDFs")]
struct Cli {
    /// Config file (default: `$PELOT_CONFIG` or `config/default.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the web page and JSON API.
    Serve,
    /// Chunk, embed and store every new document in the folder.
    Ingest {
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Answer one question from the stored chunks.
    Ask { question: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_subscriber();

    let cli = Cli::parse();
    let builder = AppBuilder::from_path(resolve_config_path(cli.config)).await?;
    let assistant = builder.build_assistant().await?;

    match cli.command {
        Command::Serve => serve(&builder, assistant).await,
        Command::Ingest { folder } => {
            let report = match folder {
                Some(folder) => assistant.ingest_folder(&folder).await?,
                None => assistant.ingest().await?,
            };
            println!("{}", builder.config().ui.ingest_status(&report));
            Ok(())
        }
        Command::Ask { question } => match assistant.ask(&question).await {
            Ok(answer) => {
                println!("{answer}");
                Ok(())
            }
            Err(AssistantError::EmptyQuestion) => {
                eprintln!("{}", builder.config().ui.empty_question_warning);
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
    }
}

async fn serve(builder: &AppBuilder, assistant: Assistant) -> anyhow::Result<()> {
    let config = builder.config();
    let (shutdown_tx, shutdown_rx) = AppBuilder::build_shutdown();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        Arc::new(assistant),
        config.ui.clone(),
        shutdown_rx,
    )
    .with_max_body_size(config.gateway.max_body_size)
    .serve()
    .await?;
    Ok(())
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
