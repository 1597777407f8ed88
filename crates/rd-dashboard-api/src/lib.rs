use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use rd_core::settings::{self, SettingsHandle};
use rd_core::{config, http, logging, metrics, server};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::Duration;

pub mod gate;
pub mod relay;

pub const SERVICE_NAME: &str = "rd-dashboard-api";

#[derive(Clone)]
pub(crate) struct AppState {
    settings: SettingsHandle,
    backend: reqwest::Client,
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
}

#[derive(Serialize)]
struct DashboardIndex {
    service: &'static str,
    version: &'static str,
    routes: [&'static str; 3],
}

pub struct DashboardConfig {
    pub addr: SocketAddr,
    pub config_poll_seconds: u64,
}

pub fn load_config() -> Result<DashboardConfig> {
    let addr = config::socket_addr_from_env("DASHBOARD_ADDR", "0.0.0.0:3000")?;
    let config_poll_seconds = config::u64_from_env("DASHBOARD_CONFIG_POLL_SECONDS", 0)?;
    Ok(DashboardConfig {
        addr,
        config_poll_seconds,
    })
}

/// The full dashboard: relay routes behind the access gate, wrapped in the
/// standard HTTP layers.
pub fn router(settings: SettingsHandle, backend: reqwest::Client) -> Router {
    let state = AppState {
        settings: settings.clone(),
        backend,
    };

    let router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/calls", get(relay::list_calls))
        .route(
            "/api/calls/:id",
            get(relay::get_call).patch(relay::update_call),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(http::BODY_LIMIT_BYTES))
        .layer(gate::AccessGateLayer::new(settings, SERVICE_NAME));

    http::apply_standard_layers(router, SERVICE_NAME)
}

pub async fn run(config: DashboardConfig) -> Result<()> {
    logging::init(SERVICE_NAME);
    metrics::init(SERVICE_NAME);

    let settings = settings::watch_env(Duration::from_secs(config.config_poll_seconds));
    let snapshot = settings.get().await;
    if !snapshot.credentials.is_configured() {
        tracing::warn!("DASH_USER or DASH_PASS is empty; every protected request will be rejected");
    }
    tracing::info!(backend_url = %snapshot.backend_url, "relaying call records");

    let backend = reqwest::Client::builder()
        .build()
        .context("failed to build backend http client")?;

    server::serve(config.addr, router(settings, backend)).await
}

async fn index() -> impl IntoResponse {
    Json(DashboardIndex {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        routes: ["GET /api/calls", "GET /api/calls/:id", "PATCH /api/calls/:id"],
    })
}

async fn healthz() -> impl IntoResponse {
    Json(HealthStatus { status: "ok" })
}

async fn metrics_endpoint() -> impl IntoResponse {
    metrics::metrics_response(SERVICE_NAME)
}
