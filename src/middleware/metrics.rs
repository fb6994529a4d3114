use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::Middleware;
use crate::dispatcher::HandlerRequest;
use crate::handler::{HandlerResult, RequestHandler};

/// Middleware for collecting request metrics.
///
/// Tracks request counts and latency for everything that flows through the
/// chain below it. All counters use atomic operations for thread-safe
/// updates without locks, so a single instance can be shared (via `Arc` and
/// [`QueueEntry::Middleware`](crate::dispatcher::QueueEntry)) across the
/// dispatchers of many requests.
///
/// This middleware is passive: it never blocks a request or rewrites a
/// response, and failed dispatches are counted like successful ones.
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
        }
    }
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
        self.request_count.load(Ordering::Relaxed)
    }

    /// Calculate the average latency of the chain below this middleware
    ///
    /// Returns zero duration if no requests have been processed yet.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn process(&self, req: HandlerRequest, next: &mut dyn RequestHandler) -> HandlerResult {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let res = next.handle(req);
        self.total_latency_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        res
    }
}
