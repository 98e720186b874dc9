#![warn(missing_docs)]
//! SweepBench Metrics - Counter Registry
//!
//! A [`CounterRegistry`] hands out prometheus counters by name, creating each
//! on first use. Targets receive a registry handle explicitly and count
//! whatever they consider interesting (rows written, cache misses). The
//! runner itself never touches it.
//!
//! A [`MetricsServer`] optionally exposes the same counters over HTTP for
//! scraping during a run.

mod exporter;

pub use exporter::MetricsServer;

use fxhash::FxHashMap;
use parking_lot::Mutex;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::Arc;
use thiserror::Error;

/// Errors from the counter registry
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Invalid metric name, or registration rejected
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Exposition text was not valid UTF-8
    #[error("metrics encoding: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The exporter could not bind or start
    #[error("metrics server: {0}")]
    Io(#[from] std::io::Error),
}

struct Inner {
    registry: Registry,
    counters: Mutex<FxHashMap<String, IntCounter>>,
}

/// Get-or-create counters over a prometheus registry; clones share state
#[derive(Clone)]
pub struct CounterRegistry {
    inner: Arc<Inner>,
}

impl CounterRegistry {
    /// Registry with no counters
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Wrap an existing prometheus registry
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                counters: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Counter named `name`, registered on first request
    pub fn counter(&self, name: &str) -> Result<IntCounter, MetricsError> {
        let mut counters = self.inner.counters.lock();
        if let Some(counter) = counters.get(name) {
            return Ok(counter.clone());
        }

        let counter = IntCounter::new(name, name)?;
        self.inner.registry.register(Box::new(counter.clone()))?;
        counters.insert(name.to_string(), counter.clone());
        Ok(counter)
    }

    /// Current value of a counter, `None` if it was never created
    pub fn value(&self, name: &str) -> Option<u64> {
        self.inner.counters.lock().get(name).map(IntCounter::get)
    }

    /// Names of all created counters, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.counters.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Serve these counters at `http://{addr}/metrics` until the handle drops
    pub fn serve(&self, addr: std::net::SocketAddr) -> Result<MetricsServer, MetricsError> {
        MetricsServer::start(self.clone(), addr)
    }

    /// Prometheus text exposition of every registered metric
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.inner.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl Default for CounterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CounterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterRegistry")
            .field("counters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_same_counter() {
        let metrics = CounterRegistry::new();
        metrics.counter("rows_inserted").unwrap().inc();
        metrics.counter("rows_inserted").unwrap().inc_by(4);
        assert_eq!(metrics.value("rows_inserted"), Some(5));
        assert_eq!(metrics.value("rows_deleted"), None);
        assert_eq!(metrics.names(), vec!["rows_inserted"]);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CounterRegistry::new();
        let handle = metrics.clone();
        handle.counter("cache_miss").unwrap().inc();
        assert_eq!(metrics.value("cache_miss"), Some(1));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let metrics = CounterRegistry::new();
        assert!(metrics.counter("not a metric").is_err());
        assert!(metrics.names().is_empty());
    }

    #[test]
    fn test_encode_text() {
        let metrics = CounterRegistry::new();
        metrics.counter("replace_total").unwrap().inc_by(3);
        let text = metrics.encode_text().unwrap();
        assert!(text.contains("# TYPE replace_total counter"));
        assert!(text.contains("replace_total 3"));
    }
}
