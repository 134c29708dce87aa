use axum::{extract::State, routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

/// One-time series registration (so HELP lines show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("upstream_requests_total", "Upstream calls issued, by endpoint.");
        describe_counter!("upstream_failures_total", "Upstream calls that failed, by endpoint.");
        describe_histogram!("upstream_request_ms", "Upstream call latency in milliseconds.");
        describe_counter!(
            "aggregate_region_failures_total",
            "Region calls absorbed as empty during a fan-out."
        );
        describe_histogram!("aggregate_duration_ms", "Wall time of a full fan-out.");
        describe_counter!(
            "fallback_substitutions_total",
            "Searches answered with a headline aggregation."
        );
    });
}

impl Metrics {
    /// Install the global Prometheus recorder. Only the binary should call
    /// this; a second install in the same process fails.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// `GET /metrics`, text exposition rendered from the installed handle.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render))
            .with_state(self.handle.clone())
    }
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
