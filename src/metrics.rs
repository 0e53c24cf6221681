use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

static METRICS_ENABLED: OnceLock<bool> = OnceLock::new();
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// `METRICS_ENABLED`, read once per process. On unless set to `false` or `0`.
pub fn is_metrics_enabled() -> bool {
    *METRICS_ENABLED.get_or_init(|| {
        std::env::var("METRICS_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder once per process and returns its handle.
/// Returns `None` when metrics are disabled.
pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
    if !is_metrics_enabled() {
        return Ok(None);
    }
    if let Some(handle) = RECORDER.get() {
        return Ok(Some(handle.clone()));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )
        .context("invalid histogram buckets")?
        .install_recorder()
        .context("failed to install prometheus recorder")?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep.run_upkeep();
        }
    });

    let _ = RECORDER.set(handle.clone());
    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_metrics_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn track_user_registered() {
    if is_metrics_enabled() {
        counter!("users_registered_total").increment(1);
    }
}

pub fn track_session_issued() {
    if is_metrics_enabled() {
        counter!("session_tokens_issued_total").increment(1);
    }
}

pub fn track_auth_failure(reason: &'static str) {
    if is_metrics_enabled() {
        counter!("auth_failures_total", "reason" => reason).increment(1);
    }
}

pub fn track_post_created() {
    if is_metrics_enabled() {
        counter!("posts_created_total").increment(1);
    }
}

pub fn track_post_update_conflict() {
    if is_metrics_enabled() {
        counter!("post_update_conflicts_total").increment(1);
    }
}

pub fn track_rate_limit_rejection() {
    if is_metrics_enabled() {
        counter!("rate_limit_rejections_total").increment(1);
    }
}
