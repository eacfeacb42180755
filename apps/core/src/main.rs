mod analytics;
mod api;
mod classifier;
mod config;
mod database;
mod error;
mod fs_manager;
mod logging;
mod models;
mod rate_limiter;
mod submission;
mod traits;
mod uploads;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::database::SqliteComplaintStore;
use crate::fs_manager::{DataPaths, LocalImageStorage};
use crate::rate_limiter::RateLimiter;
use crate::submission::SubmissionService;
use crate::traits::{ComplaintStore, ImageStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init_tracing(config.log_json)?;

    // Initialize the data directory layout
    let paths = DataPaths::new(&config.data_dir);
    paths.init()?;

    let pool = database::init_db(&paths.db_file()).await?;
    let store: Arc<dyn ComplaintStore> = Arc::new(SqliteComplaintStore::new(pool));
    let images: Arc<dyn ImageStorage> = Arc::new(LocalImageStorage::new(
        paths.clone(),
        config.public_base_url.clone(),
        config.max_image_bytes,
    ));
    let classifier = classifier::build_classifier(&config.classifier)?;

    let submissions = SubmissionService::new(
        classifier,
        store.clone(),
        images,
        RateLimiter::new(config.submit_limit, config.submit_window),
    );

    let app = api::router(AppState {
        submissions: Arc::new(submissions),
        store,
        uploads_dir: paths.uploads_dir(),
        max_image_bytes: config.max_image_bytes,
    });

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("CivicVoice listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
