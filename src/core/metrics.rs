use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub(crate) const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub(crate) const PDF_RENDER_TOTAL: &str = "pdf_render_total";
pub(crate) const PDF_RENDER_DURATION: &str = "pdf_render_duration_seconds";

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);

    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "HTTP requests by method, path and status");
    metrics::describe_histogram!(HTTP_REQUEST_DURATION, "HTTP request latency");
    metrics::describe_counter!(PDF_RENDER_TOTAL, "Paper renders by outcome");
    metrics::describe_histogram!(PDF_RENDER_DURATION, "Time spent in the PDF renderer");
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}
