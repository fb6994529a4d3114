//! Dispatcher core module - hot path for queue traversal.
//!
//! Everything request-shaped lives here too: middleware only ever sees
//! [`HandlerRequest`] and [`HandlerResponse`], and the dispatcher moves them
//! through the chain without reading or rewriting them.

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::handler::{HandlerResult, RequestHandler};
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::resolver::{MiddlewareResolver, Resolved};

use super::error::DispatchError;

/// Maximum number of query parameters before heap allocation.
/// Most requests carry only a handful of parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers/cookies before heap allocation.
/// Most requests have ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` instead of `String`: names repeat across
/// requests, and `Arc::clone()` is an O(1) atomic increment. Values remain
/// `String` as they are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header/cookie storage for the hot path.
///
/// Same `Arc<str>` key convention as [`ParamVec`]: header names such as
/// `content-type` repeat on every request.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed through the middleware chain.
///
/// The dispatcher treats this as an opaque value: it is moved from unit to
/// unit unchanged, and only middleware and the terminal handler ever look
/// inside.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path
    pub path: String,
    /// Query string parameters (stack-allocated for ≤8 params)
    pub query_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header (stack-allocated for ≤16 cookies)
    pub cookies: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Create a request with the given method and path and no parameters,
    /// headers, or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: None,
        }
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate query parameter names
    /// exist (e.g., `?limit=10&limit=20`), returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response data produced by a middleware or the terminal handler.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        // Remove existing header with same name (case-insensitive)
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Directly invocable middleware unit.
///
/// Equivalent to [`Middleware::process`] as a plain function: the unit
/// receives the request and the rest of the chain, and may call the chain
/// zero, one, or several times.
pub type MiddlewareFn =
    dyn Fn(HandlerRequest, &mut dyn RequestHandler) -> HandlerResult + Send + Sync;

/// One entry in the middleware queue.
///
/// Entries come in three forms: a middleware object, a directly invocable
/// unit, or an opaque name meant for a [`MiddlewareResolver`]. Entries are
/// cheap to clone; the invocable forms are shared behind `Arc`.
#[derive(Clone)]
pub enum QueueEntry {
    /// A middleware object
    Middleware(Arc<dyn Middleware>),
    /// A directly invocable unit
    Func(Arc<MiddlewareFn>),
    /// An opaque name, resolved at dispatch time
    Named(String),
}

impl QueueEntry {
    /// Wrap a middleware object.
    pub fn middleware(mw: impl Middleware + 'static) -> Self {
        QueueEntry::Middleware(Arc::new(mw))
    }

    /// Wrap a plain function or closure.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(HandlerRequest, &mut dyn RequestHandler) -> HandlerResult + Send + Sync + 'static,
    {
        QueueEntry::Func(Arc::new(f))
    }

    /// Reference a middleware by name, to be looked up by a resolver.
    pub fn named(name: impl Into<String>) -> Self {
        QueueEntry::Named(name.into())
    }

    /// Identity view for entries that are already invocable.
    ///
    /// Returns `None` for named entries, which require a resolver.
    #[must_use]
    pub fn as_invocable(&self) -> Option<Resolved> {
        match self {
            QueueEntry::Middleware(mw) => Some(Resolved::Middleware(Arc::clone(mw))),
            QueueEntry::Func(f) => Some(Resolved::Func(Arc::clone(f))),
            QueueEntry::Named(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            QueueEntry::Middleware(_) => "middleware object".to_string(),
            QueueEntry::Func(_) => "callable".to_string(),
            QueueEntry::Named(name) => format!("named entry \"{}\"", name),
        }
    }
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueEntry::Middleware(_) => f.write_str("QueueEntry::Middleware"),
            QueueEntry::Func(_) => f.write_str("QueueEntry::Func"),
            QueueEntry::Named(name) => f.debug_tuple("QueueEntry::Named").field(name).finish(),
        }
    }
}

impl From<Arc<dyn Middleware>> for QueueEntry {
    fn from(mw: Arc<dyn Middleware>) -> Self {
        QueueEntry::Middleware(mw)
    }
}

impl From<&str> for QueueEntry {
    fn from(name: &str) -> Self {
        QueueEntry::Named(name.to_string())
    }
}

impl From<String> for QueueEntry {
    fn from(name: String) -> Self {
        QueueEntry::Named(name)
    }
}

/// Dispatcher that drives a middleware queue as a chain of responsibility.
///
/// Owns the queue, a cursor into it, the terminal handler invoked once the
/// queue is exhausted, and an optional [`MiddlewareResolver`]. The
/// dispatcher implements [`RequestHandler`] itself and passes itself to
/// each unit as "the rest of the chain", so re-entrant calls continue the
/// same traversal.
///
/// One top-level dispatch must own the dispatcher exclusively for its
/// duration: the cursor is advanced in place and shared into recursive
/// calls. The type is deliberately not `Clone` for this reason; run each
/// concurrent request on its own instance.
pub struct Dispatcher {
    queue: Vec<QueueEntry>,
    cursor: usize,
    terminal: Box<dyn RequestHandler>,
    resolver: Option<Arc<dyn MiddlewareResolver>>,
}

impl Dispatcher {
    /// Create a dispatcher with an empty queue and no resolver.
    ///
    /// Without a resolver every queue entry must already be invocable;
    /// reaching a named entry fails the dispatch with
    /// [`DispatchError::InvalidEntry`].
    pub fn new(terminal: impl RequestHandler + 'static) -> Self {
        Dispatcher {
            queue: Vec::new(),
            cursor: 0,
            terminal: Box::new(terminal),
            resolver: None,
        }
    }

    /// Create a dispatcher that passes every entry through `resolver`.
    pub fn with_resolver(
        terminal: impl RequestHandler + 'static,
        resolver: Arc<dyn MiddlewareResolver>,
    ) -> Self {
        Dispatcher {
            queue: Vec::new(),
            cursor: 0,
            terminal: Box::new(terminal),
            resolver: Some(resolver),
        }
    }

    /// Replace the queue wholesale and reset the cursor to the start.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::EmptyQueue`] if `queue` has no entries; the
    /// dispatcher never holds a configured-but-empty queue, and the previous
    /// queue is left in place when configuration is rejected.
    pub fn set_queue(&mut self, queue: Vec<QueueEntry>) -> Result<(), DispatchError> {
        if queue.is_empty() {
            return Err(DispatchError::EmptyQueue);
        }
        debug!(queue_len = queue.len(), "middleware queue replaced");
        self.queue = queue;
        self.cursor = 0;
        Ok(())
    }

    /// Splice entries into the queue at the current cursor position.
    ///
    /// The entries keep their given order and become the next units to
    /// execute, ahead of the entry the cursor previously pointed at. Entries
    /// already consumed are never touched. A middleware can reach this
    /// through [`RequestHandler::as_dispatcher`] on its continuation to run
    /// extra units immediately after itself.
    ///
    /// If the queue is exhausted the call is a silent no-op and the queue is
    /// left unchanged: there is no in-flight traversal to attach the entries
    /// to. Callers must not assume insertion always succeeds observably.
    pub fn add_queue(&mut self, entries: Vec<QueueEntry>) {
        if self.cursor >= self.queue.len() {
            debug!(
                cursor = self.cursor,
                queue_len = self.queue.len(),
                dropped = entries.len(),
                "queue exhausted, insertion ignored"
            );
            return;
        }
        debug!(
            cursor = self.cursor,
            inserted = entries.len(),
            "entries spliced at cursor"
        );
        // Cursor index is unchanged, so it now reads the first new entry.
        self.queue.splice(self.cursor..self.cursor, entries);
    }

    /// Number of entries currently in the queue.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Current cursor position (equal to [`queue_len`](Self::queue_len)
    /// once the queue is exhausted).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the traversal has consumed every entry.
    ///
    /// Exhaustion is terminal for the traversal (every further dispatch goes
    /// straight to the terminal handler) but not for the dispatcher:
    /// [`set_queue`](Self::set_queue) resets it.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }
}

impl RequestHandler for Dispatcher {
    /// Execute the next unit in the queue, or the terminal handler once the
    /// queue is exhausted.
    ///
    /// The entry at the cursor is read and the cursor advanced *before* the
    /// unit runs, so a unit calling back into the chain always progresses
    /// forward and never re-processes its own entry. Entries that resolve to
    /// skip are passed over within the same call.
    fn handle(&mut self, req: HandlerRequest) -> HandlerResult {
        let Some(entry) = self.queue.get(self.cursor).cloned() else {
            debug!(
                request_id = %req.request_id,
                cursor = self.cursor,
                "queue exhausted, delegating to terminal handler"
            );
            return self.terminal.handle(req);
        };

        self.cursor += 1;

        let resolved = match &self.resolver {
            Some(resolver) => resolver.resolve(&entry),
            None => match entry.as_invocable() {
                Some(resolved) => Some(resolved),
                None => {
                    return Err(DispatchError::InvalidEntry {
                        entry: entry.describe(),
                    })
                }
            },
        };

        match resolved {
            None => {
                debug!(
                    request_id = %req.request_id,
                    cursor = self.cursor,
                    entry = ?entry,
                    "entry did not resolve, skipping"
                );
                self.handle(req)
            }
            Some(Resolved::Middleware(mw)) => mw.process(req, self),
            Some(Resolved::Func(f)) => f(req, self),
        }
    }

    fn as_dispatcher(&mut self) -> Option<&mut Dispatcher> {
        Some(self)
    }
}
