use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dostu_cli::{config::Config, Repl};
use dostu_client::{ExchangeClient, HttpExchangeClient};
use dostu_persist::FileStore;
use dostu_session::SessionCoordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Dostu chat");

    tracing::info!("Opening chat storage at {}", config.storage.data_dir.display());
    let store = Arc::new(FileStore::open(&config.storage.data_dir).await?);

    let endpoint = config.endpoint();
    let client: Arc<dyn ExchangeClient> = Arc::new(HttpExchangeClient::new(&endpoint)?);
    tracing::info!("Using chat endpoint {}", endpoint.url());

    let coordinator = SessionCoordinator::builder()
        .store(store)
        .client(client)
        .config(config.chat())
        .build()?;

    let mut repl = Repl::new(coordinator, BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    repl.run().await
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so they do not interleave with the conversation
    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
