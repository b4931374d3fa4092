use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Middleware;
use crate::handler::{BoxHandler, Request, Response};

#[derive(Debug, Default)]
struct Counters {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
}

/// Middleware for collecting Prometheus-compatible request metrics
///
/// All counters use relaxed atomics: metrics are eventually consistent but
/// never block a request. Clones share the same counters, so keep one clone
/// for reading while another is registered on routes.
///
/// Metrics collected:
/// - Total request count
/// - Average latency (time spent in the inner layers)
/// - 4xx and 5xx response counts
#[derive(Debug, Clone, Default)]
pub struct MetricsMiddleware {
    counters: Arc<Counters>,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.counters.request_count.load(Ordering::Relaxed)
    }

    /// Number of responses with a 4xx status
    #[must_use]
    pub fn client_errors(&self) -> usize {
        self.counters.client_errors.load(Ordering::Relaxed)
    }

    /// Number of responses with a 5xx status
    #[must_use]
    pub fn server_errors(&self) -> usize {
        self.counters.server_errors.load(Ordering::Relaxed)
    }

    /// Calculate the average request latency
    ///
    /// Returns zero duration if no requests have been processed yet.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count() as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.counters.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Render the counters in Prometheus text exposition format
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        format!(
            "# HELP brrtmux_requests_total Total requests dispatched to a matched route\n\
             # TYPE brrtmux_requests_total counter\n\
             brrtmux_requests_total {requests}\n\
             # HELP brrtmux_request_latency_seconds_avg Average handler latency\n\
             # TYPE brrtmux_request_latency_seconds_avg gauge\n\
             brrtmux_request_latency_seconds_avg {latency:.6}\n\
             # HELP brrtmux_responses_errors_total Error responses by class\n\
             # TYPE brrtmux_responses_errors_total counter\n\
             brrtmux_responses_errors_total{{class=\"4xx\"}} {client}\n\
             brrtmux_responses_errors_total{{class=\"5xx\"}} {server}\n",
            requests = self.request_count(),
            latency = self.average_latency().as_secs_f64(),
            client = self.client_errors(),
            server = self.server_errors(),
        )
    }
}

impl Middleware for MetricsMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let counters = Arc::clone(&self.counters);
        Arc::new(move |res: &mut Response, req: &mut Request| {
            counters.request_count.fetch_add(1, Ordering::Relaxed);
            let start = Instant::now();

            next.serve(res, req);

            counters
                .total_latency_ns
                .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
            let status = res.status();
            if status.is_client_error() {
                counters.client_errors.fetch_add(1, Ordering::Relaxed);
            } else if status.is_server_error() {
                counters.server_errors.fetch_add(1, Ordering::Relaxed);
            }
        })
    }
}
