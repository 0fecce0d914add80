//! Terminal todo-list client.
//!
//! Reads configuration from the environment (and `.env`), then runs the
//! terminal UI against the configured REST service.

use anyhow::{Context, Result};
use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todoapp::{AppConfig, ConfigError, HttpTodoApi, TodoController, TodoEnvironment};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    // Without a user id there is no list to show, only the warning. It is
    // returned bare so the user sees it without the "invalid configuration" prefix
    let config = match AppConfig::from_env() {
        Err(ConfigError::MissingUserId) => return Err(ConfigError::MissingUserId.into()),
        other => other.context("invalid configuration")?,
    };

    init_tracing(&config)?;
    tracing::info!(api_url = %config.api_url, user_id = %config.user_id, "Starting todoapp");

    let api = HttpTodoApi::new(config.api_url.clone(), config.user_id, config.request_timeout)
        .context("failed to build HTTP client")?;
    let environment = TodoEnvironment::new(Arc::new(api), config.user_id)
        .with_error_dismiss(config.error_dismiss);
    let controller = TodoController::new(environment);

    let result = todoapp::tui::run(controller.clone()).await;

    if let Err(error) = controller.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!(%error, "Requests still outstanding at exit");
    }
    tracing::info!("todoapp stopped");

    result
}

/// Send logs to the configured file; the terminal belongs to the UI
fn init_tracing(config: &AppConfig) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todoapp=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
