//! Prometheus Exporter
//!
//! Serves a registry's exposition text at `GET /metrics` so counters can be
//! scraped while a soak is still running. The server owns a background
//! thread with its own runtime, so blocking case bodies on the caller's
//! thread never stall a scrape.

use crate::{CounterRegistry, MetricsError};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::net::{SocketAddr, TcpListener};
use std::thread::JoinHandle;
use tokio::sync::oneshot;

/// Content type of the prometheus text format
const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// A running `/metrics` endpoint; stops when dropped
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MetricsServer {
    /// Bind `addr` and start serving `registry`.
    ///
    /// Binding happens before this returns, so a port conflict is reported
    /// here rather than lost on the background thread. Port 0 picks a free
    /// port; see [`MetricsServer::local_addr`].
    pub fn start(registry: CounterRegistry, addr: SocketAddr) -> Result<Self, MetricsError> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("sweepbench-metrics".into())
            .spawn(move || {
                runtime.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => listener,
                        Err(e) => {
                            tracing::error!(error = %e, "metrics listener unusable");
                            return;
                        }
                    };
                    let app = Router::new()
                        .route("/metrics", get(scrape))
                        .with_state(registry);
                    let served = axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            let _ = signal.await;
                        })
                        .await;
                    if let Err(e) = served {
                        tracing::error!(error = %e, "metrics server stopped");
                    }
                });
            })?;

        tracing::info!(%addr, "serving metrics at /metrics");
        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MetricsServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn scrape(State(registry): State<CounterRegistry>) -> Response {
    match registry.encode_text() {
        Ok(text) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::time::Duration;

    fn fetch(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        write!(
            stream,
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[test]
    fn test_scrape_sees_live_counters() {
        let metrics = CounterRegistry::new();
        let server = MetricsServer::start(metrics.clone(), loopback()).unwrap();
        assert_ne!(server.local_addr().port(), 0);

        metrics.counter("insert_write_total").unwrap().inc_by(2);
        let first = fetch(server.local_addr(), "/metrics");
        assert!(first.starts_with("HTTP/1.1 200 OK"));
        assert!(first.contains(TEXT_FORMAT));
        assert!(first.contains("insert_write_total 2"));

        metrics.counter("insert_write_total").unwrap().inc();
        let second = fetch(server.local_addr(), "/metrics");
        assert!(second.contains("insert_write_total 3"));
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let server = MetricsServer::start(CounterRegistry::new(), loopback()).unwrap();
        let response = fetch(server.local_addr(), "/");
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_port_in_use_is_error() {
        let first = MetricsServer::start(CounterRegistry::new(), loopback()).unwrap();
        assert!(MetricsServer::start(CounterRegistry::new(), first.local_addr()).is_err());
    }
}
