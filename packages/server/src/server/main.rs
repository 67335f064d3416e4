// Main entry point for the job execution service

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jobqueue_core::kernel::jobs::{DispatchQueue, JobStore, TaskRegistry, WorkerPool};
use jobqueue_core::server::build_app;
use jobqueue_core::tasks::register_builtin_tasks;
use jobqueue_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jobqueue_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting job execution service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Build the task registry, then freeze it
    let mut registry = TaskRegistry::new();
    register_builtin_tasks(&mut registry);
    let registry = Arc::new(registry);
    tracing::info!(tasks = ?registry.registered_names(), "task registry built");

    let store = Arc::new(JobStore::new());
    let queue = Arc::new(DispatchQueue::new());

    // Start the worker pool
    let pool = WorkerPool::spawn(config.worker_count, store.clone(), queue.clone(), registry);
    tracing::info!(workers = pool.worker_count(), "worker pool started");

    // Build application
    let app = build_app(store, queue, config.worker_count);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("POST /jobs - submit a job");
    tracing::info!("GET /jobs/<job_id> - poll job status");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Drain the workers before exiting
    tracing::info!("Shutting down, waiting for workers to finish current jobs");
    pool.shutdown(Duration::from_secs(config.shutdown_grace_secs))
        .await;
    tracing::info!("All workers stopped. Exiting.");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received shutdown signal");
}
