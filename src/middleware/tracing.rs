use std::time::Instant;

use tracing::{field, info_span};

use super::Middleware;
use crate::dispatcher::HandlerRequest;
use crate::handler::{HandlerResult, RequestHandler};

/// Wraps the rest of the chain in a `request` span and records the response
/// status and latency on it.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn process(&self, req: HandlerRequest, next: &mut dyn RequestHandler) -> HandlerResult {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = ?req.method,
            path = %req.path,
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let start = Instant::now();
        let res = {
            let _guard = span.enter();
            next.handle(req)
        };
        if let Ok(resp) = &res {
            span.record("status", resp.status);
        }
        span.record("latency_ms", start.elapsed().as_millis() as u64);
        res
    }
}
