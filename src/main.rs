use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use irisdb::{
    config::Config,
    error::Result,
    iris::store::IrisStore,
    logging,
    server::{AppState, create_router},
    sql::engine::sqlite::SqliteEngine,
};

/// HTTP service storing the Iris dataset in SQLite
#[derive(Parser, Debug)]
#[command(name = "irisdb", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.database {
        config.database.path = path;
    }

    logging::init(&config.logging);
    info!("Starting irisdb v{}", env!("CARGO_PKG_VERSION"));
    info!("  Database: {}", config.database.path.display());
    info!("  Sync url: {}", config.sync.default_url);

    // Fail before binding if the database is unusable
    let store = IrisStore::new(SqliteEngine::open(&config.database.path)?)?;
    info!("  Stored records: {}", store.count()?);
    drop(store);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(config))).await?;
    Ok(())
}
