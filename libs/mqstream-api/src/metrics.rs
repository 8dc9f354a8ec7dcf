use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use dashmap::DashMap;

/// Shared metric registry — a read-mostly collaborator handed to every
/// transformer input so custom business logic can be monitored.
///
/// Registration is safe under concurrency: the same name always resolves
/// to the same underlying cell, no matter how many threads register it
/// simultaneously.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    counters: DashMap<String, Arc<AtomicU64>>,
    gauges: DashMap<String, Arc<AtomicI64>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the counter registered under `name`, creating it at zero
    /// on first use.
    pub fn counter(&self, name: &str) -> Counter {
        Counter(self.counters.entry(name.to_owned()).or_default().clone())
    }

    /// Handle to the gauge registered under `name`, creating it at zero
    /// on first use.
    pub fn gauge(&self, name: &str) -> Gauge {
        Gauge(self.gauges.entry(name.to_owned()).or_default().clone())
    }

    /// Point-in-time view of every registered metric.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
                .collect(),
            gauges: self
                .gauges
                .iter()
                .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

/// Monotonic counter handle. Cheap to clone; all clones share the cell.
#[derive(Debug, Clone)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    pub fn increment(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Last-value gauge handle. Cheap to clone; all clones share the cell.
#[derive(Debug, Clone)]
pub struct Gauge(Arc<AtomicI64>);

impl Gauge {
    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Relaxed);
    }

    pub fn add(&self, delta: i64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn value(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Serializable point-in-time view of a [`MetricRegistry`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, i64>,
}
