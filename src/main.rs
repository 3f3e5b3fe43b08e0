mod config;
mod server;
mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gcal_mcp_google::CalendarContext;
use gcal_mcp_google::app_config::SecretsSource;
use gcal_mcp_google::authorizer::Authorizer;
use gcal_mcp_google::consent::BrowserConsent;
use gcal_mcp_google::session::{ClientFactory, GoogleConnector};
use gcal_mcp_google::store::{FileTokenStore, SqliteTokenStore, TokenStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, TokenBackend};
use crate::tools::Dispatcher;

#[derive(Parser)]
#[command(name = "gcal-mcp")]
#[command(about = "MCP tool server for Google Calendar over stdio", version)]
struct Cli {
    /// Config file (defaults to ~/.config/gcal-mcp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP requests on stdin/stdout (default)
    Serve,
    /// Authorize with Google and save the credential, then exit
    Auth,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gcal_mcp=info,gcal_mcp_google=info".into()),
        )
        // stdout carries protocol messages only
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn build_context(config: &AppConfig) -> Result<CalendarContext> {
    let store: Arc<dyn TokenStore> = match config.token_backend {
        TokenBackend::File => {
            let store = FileTokenStore::new(config.token_path()?);
            tracing::debug!(path = %store.path().display(), "Using token file");
            Arc::new(store)
        }
        TokenBackend::Sqlite => {
            let path = config.token_db_path()?;
            Arc::new(
                SqliteTokenStore::open(&path)
                    .await
                    .with_context(|| format!("Failed to open token database {}", path.display()))?,
            )
        }
    };

    let authorizer = Authorizer::new(
        SecretsSource::File(config.client_secret_path()?),
        store,
        Arc::new(BrowserConsent::new(config.redirect_port)),
    );

    let factory = ClientFactory::new(
        authorizer,
        Arc::new(
            GoogleConnector::new(config.api_base_url.clone())
                .with_token_url(config.token_url.clone()),
        ),
    );

    let timezone = config.timezone();
    tracing::info!(calendar_id = %config.calendar_id, %timezone, "Calendar context ready");

    Ok(CalendarContext::new(
        factory,
        config.calendar_id.clone(),
        timezone,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let ctx = build_context(&config).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting MCP server on stdio");

            let dispatcher = Dispatcher::new(ctx);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());

            server::serve(stdin, tokio::io::stdout(), &dispatcher).await
        }
        Commands::Auth => {
            let credential = ctx
                .factory()
                .authorizer()
                .authorize()
                .await
                .context("Authorization failed")?;

            eprintln!("Authorized client {}.", credential.client_id);

            Ok(())
        }
    }
}
