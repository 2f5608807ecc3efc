use clap::Parser;
use recipe_catalog::{
    api::{handlers::AppState, routes},
    cli::{commands, Cli, Commands},
    config::Settings,
    db, Error, Result,
};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_catalog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; CLI overrides are applied before validation
    let mut settings = Settings::from_env()?;
    if let Commands::Serve { port, host } = &cli.command {
        settings = settings.with_server_overrides(*port, host.clone());
    }
    settings.validate()?;

    match cli.command {
        Commands::Serve { .. } => {
            serve(settings).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Export { output } => {
            export(settings, &output).await?;
        }
        Commands::Import { input } => {
            import(settings, &input).await?;
        }
    }

    Ok(())
}

async fn serve(settings: Settings) -> Result<()> {
    info!("Starting recipe catalog ({} environment)", settings.environment);
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    let state = AppState {
        pool: pool.clone(),
        settings: settings.clone(),
    };

    let app = routes::create_router(state, &settings)?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    info!(
        "Server listening on http://{} (rate limits per minute: default {}, video {}, upload {})",
        addr,
        settings.rate_limit.default_per_minute,
        settings.rate_limit.video_per_minute,
        settings.rate_limit.upload_per_minute
    );

    // Connect info feeds the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    info!("Migrations completed successfully");
    Ok(())
}

async fn export(settings: Settings, output: &Path) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let count = commands::export_to_file(&pool, output).await?;
    println!("Exported {count} recipes to {}", output.display());
    Ok(())
}

async fn import(settings: Settings, input: &Path) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let count = commands::import_from_file(&pool, input).await?;
    println!("Imported {count} recipes from {}", input.display());
    Ok(())
}
