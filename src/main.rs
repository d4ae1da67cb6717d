use std::sync::Arc;

use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use innkeep::auth::{AdminGate, StaticCredential};
use innkeep::compactor::run_compactor;
use innkeep::config::Config;
use innkeep::engine::Engine;
use innkeep::http::{ADMIN_PASSWORD_HEADER, AppState, router};
use innkeep::notify::{LogSink, NotifyHub, run_dispatcher};
use innkeep::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("innkeep=info")),
        )
        .init();

    let config = Config::from_env();
    observability::init(config.metrics_port);
    std::fs::create_dir_all(&config.data_dir)?;

    let notify = Arc::new(NotifyHub::new());
    let engine = Arc::new(Engine::new(
        config.wal_path(),
        config.settings,
        notify.clone(),
    )?);
    info!(
        wal = %config.wal_path().display(),
        weekday_price = config.settings.weekday_price,
        weekend_price = config.settings.weekend_price,
        min_nights = config.settings.min_nights,
        "calendar loaded"
    );

    tokio::spawn(run_compactor(engine.clone(), config.compact_threshold));
    tokio::spawn(run_dispatcher(notify, Arc::new(LogSink)));

    let gate = Arc::new(AdminGate::new(StaticCredential::new(
        config.admin_password.clone(),
    )));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_PASSWORD_HEADER),
        ]);

    let app = router(AppState { engine, gate }).layer(cors);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("innkeep listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("innkeep stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
