//! Prometheus metrics for the ask endpoint

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    oracle_latency: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("sqlask_requests_total", "Ask requests by outcome"),
            &["outcome"],
        )?;
        let oracle_latency = Histogram::with_opts(
            HistogramOpts::new(
                "sqlask_oracle_latency_seconds",
                "Time spent waiting for the completion service",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(oracle_latency.clone()))?;

        Ok(Self {
            registry,
            requests,
            oracle_latency,
        })
    }

    /// `outcome` is `success` or a pipeline error kind.
    pub fn record_outcome(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }

    pub fn oracle_latency(&self) -> Histogram {
        self.oracle_latency.clone()
    }

    /// Text exposition format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("Failed to encode metrics: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_counted() {
        let metrics = Metrics::new().unwrap();
        metrics.record_outcome("success");
        metrics.record_outcome("success");
        metrics.record_outcome("unsafe_query");
        metrics.oracle_latency().observe(0.3);

        let text = metrics.render();
        assert!(text.contains(r#"sqlask_requests_total{outcome="success"} 2"#));
        assert!(text.contains(r#"sqlask_requests_total{outcome="unsafe_query"} 1"#));
        assert!(text.contains("sqlask_oracle_latency_seconds_count 1"));
    }
}
