//! # Dispatcher Module
//!
//! The dispatcher module provides the traversal engine that drives a
//! middleware queue as a chain of responsibility.
//!
//! ## Overview
//!
//! A [`Dispatcher`] owns an ordered queue of [`QueueEntry`] values, a cursor
//! into it, and a terminal [`RequestHandler`](crate::handler::RequestHandler)
//! invoked once the queue is exhausted. Each dispatch step:
//!
//! 1. Reads the entry at the cursor (past-end means: delegate to the
//!    terminal handler and return its result)
//! 2. Advances the cursor by one
//! 3. Resolves the entry to an invocable unit (through the configured
//!    resolver, or directly when the entry is already invocable)
//! 4. Invokes the unit with the request and the dispatcher itself as the
//!    continuation
//!
//! Because the cursor moves before the unit runs, a unit that calls back
//! into the chain continues at the *next* entry; its own entry is never
//! re-processed within one top-level dispatch.
//!
//! ## Queue mutation
//!
//! - [`Dispatcher::set_queue`] replaces the queue wholesale and resets the
//!   cursor; an empty queue is rejected with [`DispatchError::EmptyQueue`].
//! - [`Dispatcher::add_queue`] splices entries at the cursor, so the new
//!   units run next, ahead of the entry that was about to execute. Entries
//!   already consumed are never shifted. On an exhausted queue the call is
//!   a documented silent no-op.
//!
//! ## Resolution and skip
//!
//! Entries that fail to resolve (an unknown name, a miss in the backing
//! registry) are skipped, not fatal: the dispatcher moves on to the next
//! entry within the same call. A misconfigured pipeline degrades instead of
//! aborting the request. The only entry-level hard failure is reaching a
//! named entry with no resolver configured at all
//! ([`DispatchError::InvalidEntry`]).
//!
//! ## Concurrency
//!
//! Dispatch is synchronous and depth-first; the nested-call structure is
//! what lets a unit run logic both before and after the rest of the chain.
//! Cursor state is mutated in place, so a dispatcher must not be shared by
//! concurrent top-level requests; give each request its own instance.

mod core;
mod error;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HeaderVec, MiddlewareFn, ParamVec, QueueEntry,
    MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};
pub use error::{BoxError, DispatchError};
