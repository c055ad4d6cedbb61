use std::path::PathBuf;

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use tracing::{error, info};

mod api;
mod cli;
mod config;
mod db;
mod logging;
mod shutdown;

use crate::api::{app_config, cors, fallback, job::JobService};
use crate::cli::{Cli, Command};
use crate::config::{Config, DEFAULT_DATA_FILE};
use crate::shutdown::ShutdownCoordinator;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = Config::from_env().map_err(std::io::Error::other)?;

    logging::init(&config.log_dir)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate { file } => migrate(config, file).await,
    }
}

async fn serve(config: Config) -> std::io::Result<()> {
    info!("Starting job-board application");
    info!("Configuration loaded successfully:");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Storage mode: {:?}", config.storage);
    info!("  - Log directory: {}", config.log_dir);

    let store = db::connection::connect(
        config.storage,
        config.kv.as_ref(),
        config.data_file.as_ref(),
    )
    .await
    .map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        std::io::Error::other(e)
    })?;
    let backend = store.backend();

    // One service for all workers so writes are serialized process-wide
    let job_service = web::Data::new(JobService::new(store));
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors())
            .configure(app_config(job_service.clone(), max_payload_size))
            .default_service(web::route().to(fallback))
    })
    .disable_signals();

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server = server.bind((config.host.as_str(), config.port))?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, backend)
        .wait_for_shutdown()
        .await
}

async fn migrate(config: Config, file: Option<PathBuf>) -> std::io::Result<()> {
    let source = file
        .or(config.data_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    let Some(kv) = config.kv else {
        error!("Migration needs KV_REST_API_URL and KV_REST_API_TOKEN (or VERCEL_KV_URL and VERCEL_KV_TOKEN)");
        return Err(std::io::Error::other("key-value store not configured"));
    };

    let target = db::connection::connect_kv(&kv).await.map_err(|e| {
        error!("Cannot reach the key-value store: {}", e);
        std::io::Error::other(e)
    })?;

    match db::migrations::run_migration(&source, &target).await {
        Ok(report) => {
            info!("Migration successful!");
            info!("  - Jobs migrated: {}", report.jobs_migrated);
            info!("  - Next ID: {}", report.next_id);
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(std::io::Error::other(e))
        }
    }
}
