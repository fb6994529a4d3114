//! Handler contract shared by the dispatcher, terminal handlers, and any
//! continuation a middleware calls into.
//!
//! The [`Dispatcher`] implements this trait itself, which is what lets a
//! middleware treat "the rest of the chain" as just another handler and is
//! how whole chains nest (a dispatcher can be the terminal handler of
//! another dispatcher).

use crate::dispatcher::{DispatchError, Dispatcher, HandlerRequest, HandlerResponse};

/// Result of handling a request.
pub type HandlerResult = Result<HandlerResponse, DispatchError>;

/// Something that can turn a request into a response.
///
/// Implemented by terminal handlers, by [`Dispatcher`] itself, and (via the
/// blanket impl below) by any `FnMut(HandlerRequest) -> HandlerResult`
/// closure, so tests and simple endpoints need no wrapper type.
pub trait RequestHandler: Send {
    fn handle(&mut self, req: HandlerRequest) -> HandlerResult;

    /// Borrow the underlying [`Dispatcher`] when this handler is one.
    ///
    /// Middleware receives its continuation as `&mut dyn RequestHandler`;
    /// a unit that wants to splice additional entries into the in-flight
    /// queue (run extra units immediately after itself) goes through this
    /// hook to reach [`Dispatcher::add_queue`]. Handlers that do not drive
    /// a queue keep the default `None`.
    fn as_dispatcher(&mut self) -> Option<&mut Dispatcher> {
        None
    }
}

impl<F> RequestHandler for F
where
    F: FnMut(HandlerRequest) -> HandlerResult + Send,
{
    fn handle(&mut self, req: HandlerRequest) -> HandlerResult {
        (self)(req)
    }
}
