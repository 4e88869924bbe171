use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters for one trainer session, registered in their own registry.
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    effort_dispatch: IntCounterVec,
    publish_errors: IntCounter,
    telemetry_messages: IntCounter,
    status_decode_errors: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let effort_dispatch = IntCounterVec::new(
            Opts::new("k2_effort_dispatch_total", "Effort changes dispatched, by kind"),
            &["kind"],
        )
        .expect("valid metric opts");
        let publish_errors =
            IntCounter::new("k2_publish_errors_total", "Failed command publishes")
                .expect("valid metric opts");
        let telemetry_messages =
            IntCounter::new("k2_telemetry_messages_total", "Telemetry messages rendered")
                .expect("valid metric opts");
        let status_decode_errors = IntCounter::new(
            "k2_status_decode_errors_total",
            "Status payloads that could not be decoded",
        )
        .expect("valid metric opts");

        for c in [&publish_errors, &telemetry_messages, &status_decode_errors] {
            registry
                .register(Box::new(c.clone()))
                .expect("fresh registry");
        }
        registry
            .register(Box::new(effort_dispatch.clone()))
            .expect("fresh registry");

        Self {
            registry,
            effort_dispatch,
            publish_errors,
            telemetry_messages,
            status_decode_errors,
        }
    }

    /// Prometheus text exposition of all counters.
    pub fn gather_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            log::warn!("metrics encode failed: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

pub fn effort_dispatch_total(m: &Metrics, kind: &str) -> IntCounter {
    m.effort_dispatch.with_label_values(&[kind])
}

pub fn publish_errors_total(m: &Metrics) -> &IntCounter {
    &m.publish_errors
}

pub fn telemetry_messages_total(m: &Metrics) -> &IntCounter {
    &m.telemetry_messages
}

pub fn status_decode_errors_total(m: &Metrics) -> &IntCounter {
    &m.status_decode_errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        let m = Metrics::new();
        effort_dispatch_total(&m, "level").inc();
        effort_dispatch_total(&m, "level").inc();
        publish_errors_total(&m).inc();

        let text = m.gather_text();
        assert!(text.contains("k2_effort_dispatch_total{kind=\"level\"} 2"));
        assert!(text.contains("k2_publish_errors_total 1"));
    }
}
