use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use socialfeed::logging::init_logging;
use socialfeed::router::init_router;
use socialfeed::state::init_app_state;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let state = init_app_state().await?;
    let addr: SocketAddr = state
        .server_config
        .addr
        .parse()
        .with_context(|| format!("invalid ADDR {}", state.server_config.addr))?;

    let limiter = state.rate_limiter.clone();
    if state.rate_limit_config.enabled {
        limiter.start();
    }

    let app = init_router(state.clone());
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        env = %state.server_config.env,
        api_url = %state.server_config.api_url,
        "server listening, docs at /swagger-ui and /scalar"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    limiter.stop();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
