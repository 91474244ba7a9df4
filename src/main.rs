use std::net::SocketAddr;

use tokio::{net::TcpListener, sync::watch};

mod app;
mod auth;
mod clock;
mod config;
mod db;
mod digest;
mod error;
mod items;
mod model;
mod pvz;
mod receptions;
mod state;
mod telemetry;
#[cfg(test)]
mod testing;
mod validation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "pvz=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let prometheus = telemetry::install()?;
    let app_state = state::AppState::init().await?;
    db::migrate(&app_state.db).await;

    let config = app_state.config.clone();
    let api_addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let digest_addr: SocketAddr = format!("{}:{}", config.host, config.digest_port).parse()?;
    let metrics_addr: SocketAddr = format!("{}:{}", config.host, config.metrics_port).parse()?;

    // bind all before serving so a taken port fails startup
    let api_listener = TcpListener::bind(api_addr).await?;
    let digest_listener = TcpListener::bind(digest_addr).await?;
    let metrics_listener = TcpListener::bind(metrics_addr).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let stopped = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.wait_for(|stop| *stop).await;
    };

    let api = tokio::spawn(app::serve(
        "api",
        api_listener,
        app::build_app(app_state.clone()),
        stopped(stop_rx.clone()),
    ));
    let digest = tokio::spawn(app::serve(
        "digest",
        digest_listener,
        app::build_digest_app(app_state.clone()),
        stopped(stop_rx.clone()),
    ));
    let metrics = tokio::spawn(app::serve(
        "metrics",
        metrics_listener,
        telemetry::router(prometheus),
        stopped(stop_rx),
    ));

    app::shutdown_signal().await;
    let _ = stop_tx.send(true);

    for (name, handle) in [("api", api), ("digest", digest), ("metrics", metrics)] {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, listener = name, "server failed"),
            Err(e) => tracing::error!(error = %e, listener = name, "server task panicked"),
        }
    }

    app_state.db.close().await;
    tracing::info!("database pool closed");
    Ok(())
}
