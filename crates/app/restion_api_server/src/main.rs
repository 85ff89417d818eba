//! Restion API server binary.
//!
//! Connects to PostgreSQL, runs migrations, starts the token cleanup
//! scheduler, and serves the auth API.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use restion_api::config::ApiConfig;
use restion_core::cleanup::{CLEANUP_INTERVAL, start_cleanup_scheduler};
use restion_core::store::PgStore;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "restion_api_server", about = "Restion API server")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/restion"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Seconds between token cleanup sweeps.
    #[arg(long, default_value_t = CLEANUP_INTERVAL.as_secs())]
    cleanup_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,restion_api=debug,restion_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    info!(database_url = %args.database_url, port = args.port, "starting restion_api_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    restion_api::migrate(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let state = restion_api::AppState::new(store.clone(), ApiConfig::from_env());

    // One cleanup task for the process lifetime; never restarted.
    let _cleanup = start_cleanup_scheduler(
        store.clone(),
        store,
        std::time::Duration::from_secs(args.cleanup_interval_secs),
    );

    let app = restion_api::router(state);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
