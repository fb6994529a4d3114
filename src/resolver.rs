//! Entry resolution: mapping opaque queue entries to invocable units.
//!
//! The dispatcher never interprets a [`QueueEntry::Named`] itself; a
//! [`MiddlewareResolver`] does, isolating the traversal engine from any
//! particular resolution strategy (a static map, a registry, a dependency
//! container). Resolution has exactly two outcomes - an invocable unit or a
//! skip - and a skip is not an error: the dispatcher silently advances past
//! the entry, so a misconfigured pipeline degrades instead of aborting the
//! request.

use std::sync::Arc;

use tracing::warn;

use crate::dispatcher::{MiddlewareFn, QueueEntry};
use crate::middleware::Middleware;
use crate::registry::MiddlewareProvider;

/// An entry resolved to something the dispatcher can invoke.
pub enum Resolved {
    /// A middleware object
    Middleware(Arc<dyn Middleware>),
    /// A directly invocable unit
    Func(Arc<MiddlewareFn>),
}

/// Maps a queue entry to an invocable unit, or signals a skip.
///
/// Implementations must be pure with respect to the dispatcher: a resolver
/// never mutates the queue or any other dispatch state.
pub trait MiddlewareResolver: Send + Sync {
    /// Resolve `entry` to an invocable unit.
    ///
    /// Entries that are already invocable pass through unchanged. `None`
    /// means the entry could not be resolved and the dispatcher should skip
    /// it.
    fn resolve(&self, entry: &QueueEntry) -> Option<Resolved>;
}

/// Resolver backed by a [`MiddlewareProvider`] lookup.
///
/// Already-invocable entries pass through untouched; named entries are
/// looked up in the provider. A lookup miss is logged and mapped to a skip,
/// never surfaced as an error.
pub struct ProviderResolver {
    provider: Arc<dyn MiddlewareProvider>,
}

impl ProviderResolver {
    pub fn new(provider: Arc<dyn MiddlewareProvider>) -> Self {
        Self { provider }
    }
}

impl MiddlewareResolver for ProviderResolver {
    fn resolve(&self, entry: &QueueEntry) -> Option<Resolved> {
        if let Some(resolved) = entry.as_invocable() {
            return Some(resolved);
        }
        let QueueEntry::Named(name) = entry else {
            return None;
        };
        match self.provider.get(name) {
            Ok(mw) => Some(Resolved::Middleware(mw)),
            Err(err) => {
                warn!(name = %name, error = %err, "middleware lookup failed, skipping entry");
                None
            }
        }
    }
}
