use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

/// Prometheus text exposition, when the recorder is installed.
pub fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_submission(status: &'static str) {
    metrics::counter!("submissions_total", "status" => status).increment(1);
}

pub(crate) fn record_grading(result: &'static str) {
    metrics::counter!("grading_total", "result" => result).increment(1);
}

pub(crate) fn record_grade_percentage(percentage: f64) {
    metrics::histogram!("grading_percentage").record(percentage);
}

pub(crate) fn record_peer_review(event: &'static str) {
    metrics::counter!("peer_reviews_total", "event" => event).increment(1);
}

pub(crate) fn record_publication() {
    metrics::counter!("assignments_published_total").increment(1);
}
