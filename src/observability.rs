//! # Observability
//!
//! Tracing subscriber setup, the Prometheus recorder with its small probe
//! server (`/metrics`, `/health/live`, `/health/ready`), and the span and
//! counter helpers called from the router and the profile store.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Install the Prometheus recorder and serve `/metrics` plus health probes.
///
/// Tracing must already be initialized. `data_file` is the profile table
/// location; the readiness probe reports whether its directory is writable.
pub async fn init_metrics_exporter(config: &ObservabilityConfig, data_file: PathBuf) -> Result<()> {
    if !config.enable_metrics_export {
        tracing::info!("Metrics export disabled");
        return Ok(());
    }

    let metrics_handle = init_metrics()?;
    start_metrics_server(metrics_handle, config.metrics_port, data_file).await?;

    tracing::info!(
        environment = %config.environment,
        metrics_port = %config.metrics_port,
        "Metrics exporter initialized successfully"
    );
    Ok(())
}

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("profile_bot={}", config.log_level.to_lowercase()).parse()?)
        .add_directive("teloxide=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    if config.use_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus recorder used by the `metrics` macros
fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Metrics collection initialized");
    Ok(handle)
}

async fn start_metrics_server(
    metrics_handle: PrometheusHandle,
    port: u16,
    data_file: PathBuf,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Probe server listening");

    tokio::spawn(async move {
        loop {
            let stream = match listener.accept().await {
                Ok((stream, _peer)) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept probe connection");
                    continue;
                }
            };

            let metrics_handle = metrics_handle.clone();
            let data_file = data_file.clone();
            tokio::spawn(async move {
                let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                    let response = probe_response(
                        req.method(),
                        req.uri().path(),
                        || metrics_handle.render(),
                        &data_file,
                    );
                    async move { Ok::<_, Infallible>(response) }
                });

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    tracing::debug!(error = ?e, "Probe connection closed with error");
                }
            });
        }
    });

    Ok(())
}

/// Answer one probe request. `render` produces the Prometheus exposition text.
fn probe_response<F>(method: &Method, path: &str, render: F, data_file: &Path) -> Response<String>
where
    F: FnOnce() -> String,
{
    if *method != Method::GET {
        return plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string());
    }

    match path {
        "/metrics" => {
            let mut response = plain(StatusCode::OK, render());
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
            );
            response
        }
        "/health/live" => plain(StatusCode::OK, "OK".to_string()),
        "/health/ready" => match check_storage_health(data_file) {
            Ok(()) => plain(StatusCode::OK, "OK".to_string()),
            Err(e) => plain(StatusCode::SERVICE_UNAVAILABLE, format!("NOT READY: {}", e)),
        },
        _ => plain(StatusCode::NOT_FOUND, "Not Found".to_string()),
    }
}

fn plain(status: StatusCode, body: String) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

/// Readiness check: the directory holding the profile file must be writable
pub fn check_storage_health(data_file: &Path) -> Result<()> {
    let dir = match data_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let metadata = std::fs::metadata(dir)
        .map_err(|e| anyhow::anyhow!("profile directory {} unavailable: {}", dir.display(), e))?;
    if metadata.permissions().readonly() {
        return Err(anyhow::anyhow!(
            "profile directory {} is read-only",
            dir.display()
        ));
    }
    Ok(())
}

/// Create a span for Telegram bot operations
pub fn telegram_span(operation: &str, user_id: Option<u64>) -> tracing::Span {
    tracing::info_span!(
        "telegram_operation",
        operation = operation,
        user_id = user_id,
        component = "telegram"
    )
}

/// Create a span for profile file operations
pub fn storage_span(operation: &str) -> tracing::Span {
    tracing::info_span!("storage_operation", operation = operation, component = "storage")
}

/// Record an inbound update by kind
pub fn record_telegram_event(event_type: &str) {
    let event_type = event_type.to_string();
    metrics::counter!("telegram_events_total", "type" => event_type).increment(1);
}

/// Record a handler that returned an error to the router boundary
pub fn record_handler_failure(event_type: &str) {
    let event_type = event_type.to_string();
    metrics::counter!("handler_failures_total", "type" => event_type).increment(1);
}

/// Record handler latency
pub fn record_request_metrics(event_type: &str, duration: std::time::Duration) {
    let event_type = event_type.to_string();
    metrics::histogram!("request_duration_seconds", "type" => event_type)
        .record(duration.as_secs_f64());
}

/// Record a profile table rewrite
pub fn record_profile_save(success: bool) {
    metrics::counter!("profile_saves_total", "result" => if success { "success" } else { "failure" })
        .increment(1);
}

/// Record a single broadcast delivery attempt
pub fn record_broadcast_delivery(success: bool) {
    metrics::counter!(
        "broadcast_deliveries_total",
        "result" => if success { "success" } else { "failure" }
    )
    .increment(1);
}
