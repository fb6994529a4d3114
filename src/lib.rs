//! # Conveyor
//!
//! **Conveyor** is a synchronous chain-of-responsibility middleware
//! dispatcher: give it an ordered queue of processing units and a terminal
//! handler, and it invokes each unit in order, letting every unit decide
//! whether to continue down the chain, short-circuit with its own response,
//! or delegate entirely.
//!
//! ## Overview
//!
//! The heart of the crate is the [`dispatcher`] module's traversal engine.
//! A [`Dispatcher`] owns a mutable, cursor-tracked queue of entries and a
//! terminal handler, and implements the [`RequestHandler`] contract itself.
//! When a unit runs, the dispatcher hands itself over as "the rest of the
//! chain", which is what makes the classic nested before/after structure
//! fall out of plain function calls:
//!
//! ```text
//! middleware1-before
//!   middleware2-before
//!     terminal handler
//!   middleware2-after
//! middleware1-after
//! ```
//!
//! Queue entries do not have to be invocable up front: an entry can be an
//! opaque name that a [`resolver`] maps to a registered middleware at
//! dispatch time. Entries that fail to resolve are skipped rather than
//! fatal, so a partially misconfigured pipeline degrades instead of
//! crashing request handling.
//!
//! ## Modules
//!
//! - **[`dispatcher`]** - the traversal engine, queue entries, and the
//!   request/response types carried through the chain
//! - **[`handler`]** - the `handle(request) -> response` contract shared by
//!   the dispatcher, terminal handlers, and closures
//! - **[`middleware`]** - the `process(request, next)` contract plus the
//!   built-in observability middleware (tracing, metrics)
//! - **[`resolver`]** - entry resolution with explicit resolved-vs-skip
//!   outcomes
//! - **[`registry`]** - name-keyed middleware storage backing the resolver
//! - **[`ids`]** - ULID request identifiers for log correlation
//!
//! ## Quick Start
//!
//! ```
//! use conveyor::{
//!     Dispatcher, HandlerRequest, HandlerResponse, HandlerResult, QueueEntry, RequestHandler,
//!     TracingMiddleware,
//! };
//! use http::Method;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), conveyor::DispatchError> {
//! let mut dispatcher = Dispatcher::new(|_req: HandlerRequest| -> HandlerResult {
//!     Ok(HandlerResponse::json(200, json!({ "ok": true })))
//! });
//!
//! dispatcher.set_queue(vec![
//!     QueueEntry::middleware(TracingMiddleware),
//!     QueueEntry::func(|req, next| {
//!         // runs before and after everything below it in the queue
//!         let mut res = next.handle(req)?;
//!         res.set_header("x-powered-by", "conveyor".to_string());
//!         Ok(res)
//!     }),
//! ])?;
//!
//! let res = dispatcher.handle(HandlerRequest::new(Method::GET, "/pets/12345"))?;
//! assert_eq!(res.status, 200);
//! assert_eq!(res.get_header("x-powered-by"), Some("conveyor"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution model
//!
//! Dispatch is single-threaded, synchronous, and depth-first. Each step
//! reads the entry at the cursor and advances the cursor *before* invoking
//! the unit, so re-entrant calls always move forward and no entry runs
//! twice within one top-level dispatch. Units may splice additional entries
//! into the in-flight queue (see [`Dispatcher::add_queue`]); the splice
//! lands at the cursor, ahead of the unit that was about to run, and never
//! behind it.
//!
//! A dispatcher instance is owned by one top-level request at a time -
//! cursor state is mutated in place, so concurrent requests need their own
//! instances. There is no cancellation or timeout support in the core;
//! callers wanting deadlines enforce them in the terminal handler or in
//! individual units.

pub mod dispatcher;
pub mod handler;
pub mod ids;
pub mod middleware;
pub mod registry;
pub mod resolver;

pub use dispatcher::{
    BoxError, DispatchError, Dispatcher, HandlerRequest, HandlerResponse, HeaderVec, MiddlewareFn,
    ParamVec, QueueEntry,
};
pub use handler::{HandlerResult, RequestHandler};
pub use ids::RequestId;
pub use middleware::{MetricsMiddleware, Middleware, TracingMiddleware};
pub use registry::{LookupError, MiddlewareProvider, MiddlewareRegistry};
pub use resolver::{MiddlewareResolver, ProviderResolver, Resolved};
