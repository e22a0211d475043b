//! The `inkpost` server binary.

use std::sync::Arc;

use chrono::TimeDelta;
use inkpost_domain::MemoryStore;
use inkpost_notify::{LogMailer, Notifier, Sweeper, Worker, channel};
use inkpost_server::{AppState, Config};
use salvo::prelude::*;
use salvo::server::ServerHandle;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log)?)
        .init();
    tracing::debug!(?config, "config loaded");

    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(LogMailer::new());
    let (queue, receiver) = channel();
    let queue = Arc::new(queue);
    let window = TimeDelta::from_std(config.sweep_window)?;

    let notifier = Notifier::new(store.clone(), mailer.clone(), queue.clone())
        .mail_from(&config.mail_from)
        .window(window);
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let worker = tokio::spawn(Worker::new(notifier, receiver).run(shutdown_rx.clone()));
    let sweeper = if config.sweep_interval.is_zero() {
        tracing::info!("blog sweep disabled");
        None
    } else {
        Some(tokio::spawn(
            Sweeper::new(queue.clone(), config.sweep_interval).run(shutdown_rx),
        ))
    };

    let state = AppState::new(store, queue, mailer, &config.contact_to);
    let service = inkpost_server::service(state, &config.jwt_secret);

    let acceptor = TcpListener::new(config.listen.clone()).try_bind().await?;
    let server = Server::new(acceptor);
    tokio::spawn(listen_shutdown_signal(server.handle()));
    tracing::info!(listen = %config.listen, "inkpost listening");
    server.serve(service).await;

    shutdown_tx.send(()).ok();
    worker.await?;
    if let Some(sweeper) = sweeper {
        sweeper.await?;
    }
    tracing::info!("inkpost stopped");
    Ok(())
}

async fn listen_shutdown_signal(handle: ServerHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("ctrl-c received"),
        _ = terminate => tracing::info!("terminate signal received"),
    }
    handle.stop_graceful(None);
}
