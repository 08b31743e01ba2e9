//! Coach notification server.
//!
//! Wires the ledger, dispatcher, and coordinator together and runs the
//! scheduled maintenance jobs until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use coach_core::config::AppConfig;
use coach_core::error::AppError;
use coach_service::NotificationCoordinator;
use coach_worker::jobs::reconciliation::RECONCILIATION_JOB;
use coach_worker::{CronScheduler, JobExecutor, ReconciliationJob};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("COACH_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => {
            let env = std::env::var("COACH_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting coach-notify v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Ledger, dispatcher, coordinator ──────────────────
    tracing::info!(backend = ?config.database.backend, "Opening notification ledger...");
    let coordinator = Arc::new(coach_service::build_coordinator(&config, true).await?);
    tracing::info!(
        global_limit = config.notifications.global_daily_limit,
        category_limit = config.notifications.category_daily_limit,
        quiet_hours = config.notifications.quiet_hours.enabled,
        "Notification coordinator ready"
    );

    // ── Step 2: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    // ── Step 3: Start scheduled jobs ─────────────────────────────
    let scheduler = if config.worker.enabled {
        Some(start_scheduler(&config, Arc::clone(&coordinator)).await?)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 4: Wait for shutdown ────────────────────────────────
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    while !*shutdown_rx.borrow() {
        if shutdown_rx.changed().await.is_err() {
            break;
        }
    }

    // ── Step 5: Stop background tasks ────────────────────────────
    if let Some(mut scheduler) = scheduler {
        scheduler.shutdown().await?;
    }

    tracing::info!("coach-notify shut down gracefully");
    Ok(())
}

/// Register maintenance jobs and start the cron scheduler.
async fn start_scheduler(
    config: &AppConfig,
    coordinator: Arc<NotificationCoordinator>,
) -> Result<CronScheduler, AppError> {
    tracing::info!("Starting background worker...");

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ReconciliationJob::new(
        coordinator,
        config.notifications.stale_pending_after(),
    )));
    let executor = Arc::new(executor);

    if config.worker.run_on_startup {
        // Sweep rows left pending by a previous crash before the first tick.
        if let Err(e) = executor.run(RECONCILIATION_JOB).await {
            tracing::warn!(error = %e, "Startup reconciliation failed");
        }
    }

    let scheduler = CronScheduler::new(Arc::clone(&executor)).await?;
    scheduler
        .schedule(RECONCILIATION_JOB, &config.notifications.reconcile_cron)
        .await?;
    scheduler.start().await?;

    tracing::info!("Background worker started");
    Ok(scheduler)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
