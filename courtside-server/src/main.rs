//! Courtside server.
//!
//! Live match event ingestion and aggregation: events are published onto
//! a partitioned queue keyed by match, consumed by one loop per
//! partition, and applied transactionally to the event ledger and the
//! running score; match snapshots are served through a cache-aside read
//! path.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{get_database_url, load_config};
use courtside_core::aggregator::ScoreAggregator;
use courtside_core::cache::MemoryCache;
use courtside_core::consumer::ConsumerLoop;
use courtside_core::publisher::EventPublisher;
use courtside_core::queue::partitioned_queue;
use courtside_core::reader::MatchReader;
use server::{build_router, run_server};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Courtside - live match event ingestion and scoreboard service
#[derive(Parser, Debug)]
#[command(name = "courtside-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./courtside.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8080)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting courtside-server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config, args.listen).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&db_pool).await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;
        tracing::info!("Migrations completed successfully");
    }

    // Queue and consumer fan-out: one loop per partition, all sharing one
    // aggregator over the pool. Per-match ordering holds because a match
    // key always hashes to the same partition.
    let (producer, partition_consumers) =
        partitioned_queue(config.queue.partitions, config.queue.buffer);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let aggregator = Arc::new(ScoreAggregator::new(db_pool.clone()));

    let mut consumer_handles = Vec::with_capacity(partition_consumers.len());
    for consumer in partition_consumers {
        let consumer_loop = ConsumerLoop::new(aggregator.clone(), consumer, shutdown_rx.clone());
        consumer_handles.push(tokio::spawn(consumer_loop.run()));
    }
    tracing::info!(partitions = config.queue.partitions, "Consumer loops started");

    let publisher = Arc::new(EventPublisher::new(producer));
    let cache = Arc::new(MemoryCache::new());
    let reader = Arc::new(MatchReader::new(db_pool.clone(), cache));

    let state = AppState::new(db_pool.clone(), publisher, reader);
    let router = build_router(state);

    let listen_addr = config.server.listen;
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // The HTTP listener has drained; stop the consumer loops and let any
    // in-flight apply finish before closing the pool.
    let _ = shutdown_tx.send(true);
    for handle in consumer_handles {
        let _ = handle.await;
    }

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
