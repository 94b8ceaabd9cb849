//! Entry point for the `wpsage-gateway` HTTP server.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wpsage_core::API_KEY_OPTION;
use wpsage_gateway::{
    auth::{reload_blocking, AuthGuard},
    config::GatewayConfig,
    routes::create_router,
    state::{code_backend, AppState},
};
use wpsage_store::{ConfigStore, SqliteSite};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let site = match SqliteSite::open(&config.database) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(database = %config.database.display(), error = %e, "failed to open site database");
            std::process::exit(1);
        }
    };

    if let Some(key) = &config.api_key {
        if let Err(e) = site.set(API_KEY_OPTION, key) {
            error!(error = %e, "failed to store api key");
            std::process::exit(1);
        }
    }

    let guard = match AuthGuard::from_store(site.as_ref(), config.allow_empty_key) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            error!(error = %e, "failed to read api key");
            std::process::exit(1);
        }
    };

    if !config.sql_policy.whitelist_enabled {
        warn!("sql whitelist disabled: run-sql accepts any statement, including DML and DDL");
    }

    #[cfg(unix)]
    spawn_reload_on_sighup(Arc::clone(&guard), Arc::clone(&site));

    let state = AppState::for_site(guard, site, code_backend(&config))
        .with_sql_policy(config.sql_policy)
        .with_limits(config.limits);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        addr = %config.listen_addr,
        code_backend = %config.code_backend,
        timeout_secs = config.limits.timeout.as_secs(),
        "wpsage-gateway listening"
    );

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Re-read the api key from the site database whenever SIGHUP arrives.
#[cfg(unix)]
fn spawn_reload_on_sighup(guard: Arc<AuthGuard>, site: Arc<SqliteSite>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGHUP; api key reload disabled");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            let store: Arc<dyn ConfigStore> = site.clone();
            match reload_blocking(Arc::clone(&guard), store).await {
                Ok(()) => info!("api key reloaded"),
                Err(e) => error!(error = %e, "api key reload failed; keeping current key"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
