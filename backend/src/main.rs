use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use log::info;

use mhaas_backend::config::AppConfig;
use mhaas_backend::io::rest;
use mhaas_backend::scheduler::{until_next_local_hour, Scheduler};
use mhaas_backend::storage::CsvConnection;
use mhaas_backend::Backend;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    info!("Data directory: {}", config.data_dir.display());

    let csv_conn = Arc::new(CsvConnection::new(&config.data_dir)?);
    let notifier = config.build_notifier()?;
    let backend = Arc::new(Backend::new(csv_conn, notifier));

    // Background jobs are owned here and stopped on shutdown; nothing
    // starts as an import side effect.
    let reminder_scheduler = {
        let service = backend.reminder_service.clone();
        Scheduler::spawn(
            "reminder",
            Duration::ZERO,
            Duration::from_secs(config.reminder_interval_minutes * 60),
            move || service.run_scheduled_pass(),
        )
    };
    let tip_scheduler = {
        let service = backend.tip_service.clone();
        Scheduler::spawn(
            "tip-generation",
            until_next_local_hour(config.tip_generation_hour, Local::now()),
            Duration::from_secs(24 * 60 * 60),
            move || service.run_scheduled_pass(),
        )
    };

    let app = rest::router(backend.clone());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down schedulers");
    reminder_scheduler.stop().await;
    tip_scheduler.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
