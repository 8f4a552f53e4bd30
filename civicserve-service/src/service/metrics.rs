//! Prometheus metrics plus cheap atomic counters for the periodic
//! status report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::debug;
use prometheus::{Encoder, IntCounterVec, IntGauge, Registry, TextEncoder};

use civicserve_core::foundation::CivicError;

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub operations_ok: u64,
    pub operations_failed: u64,
    pub streams_opened: u64,
    pub streams_open: u64,
}

pub struct Metrics {
    registry: Registry,
    operations_total: IntCounterVec,
    notification_streams_total: IntCounterVec,
    notification_streams_open: IntGauge,
    started_at: Instant,
    operations_ok: AtomicU64,
    operations_failed: AtomicU64,
    streams_opened: AtomicU64,
}

impl Metrics {
    pub fn new() -> Result<Self, CivicError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let operations_total = IntCounterVec::new(
            prometheus::Opts::new("civicserve_operations_total", "API operations by name and outcome"),
            &["operation", "outcome"],
        )
        .map_err(|err| CivicError::Message(err.to_string()))?;
        let notification_streams_total = IntCounterVec::new(
            prometheus::Opts::new("civicserve_notification_streams_total", "Notification stream lifecycle events"),
            &["event"],
        )
        .map_err(|err| CivicError::Message(err.to_string()))?;
        let notification_streams_open =
            IntGauge::new("civicserve_notification_streams_open", "Currently open notification streams")
                .map_err(|err| CivicError::Message(err.to_string()))?;

        registry
            .register(Box::new(operations_total.clone()))
            .map_err(|err| CivicError::Message(err.to_string()))?;
        registry
            .register(Box::new(notification_streams_total.clone()))
            .map_err(|err| CivicError::Message(err.to_string()))?;
        registry
            .register(Box::new(notification_streams_open.clone()))
            .map_err(|err| CivicError::Message(err.to_string()))?;

        Ok(Self {
            registry,
            operations_total,
            notification_streams_total,
            notification_streams_open,
            started_at: Instant::now(),
            operations_ok: AtomicU64::new(0),
            operations_failed: AtomicU64::new(0),
            streams_opened: AtomicU64::new(0),
        })
    }

    pub fn observe_operation(&self, operation: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.operations_total.with_label_values(&[operation, outcome]).inc();
        if ok {
            self.operations_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.operations_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stream_opened(&self) {
        self.notification_streams_total.with_label_values(&["opened"]).inc();
        self.notification_streams_open.inc();
        self.streams_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stream_closed(&self) {
        self.notification_streams_total.with_label_values(&["closed"]).inc();
        self.notification_streams_open.dec();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started_at.elapsed(),
            operations_ok: self.operations_ok.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
            streams_opened: self.streams_opened.load(Ordering::Relaxed),
            streams_open: self.notification_streams_open.get().max(0) as u64,
        }
    }

    pub fn encode(&self) -> Result<String, CivicError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(|err| {
            CivicError::Serialization {
                format: "prometheus".to_string(),
                details: err.to_string(),
            }
        })?;
        String::from_utf8(buffer).map_err(|err| CivicError::Serialization {
            format: "prometheus".to_string(),
            details: err.to_string(),
        })
    }
}
