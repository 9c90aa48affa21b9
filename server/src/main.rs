use tokio::net::TcpListener;
use tokio::signal;
use todo_core::CancellationToken;
use todo_server::{telemetry, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_level, config.log_format)?;
    info!(
        addr = %config.addr(),
        request_timeout_secs = config.request_timeout.as_secs(),
        "starting todo api server"
    );

    let listener = TcpListener::bind(config.addr()).await?;
    info!(addr = %listener.local_addr()?, "server listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let app = todo_server::app_with_timeout(config.request_timeout);
    let server = todo_server::run(listener, app, shutdown.clone().cancelled_owned());

    let grace = config.shutdown_timeout;
    let drain_limit = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result?,
        () = drain_limit => warn!(timeout_secs = grace.as_secs(), "server forced to shutdown"),
    }

    info!("server stopped");
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
    token.cancel();
}
