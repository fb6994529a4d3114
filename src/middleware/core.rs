use crate::dispatcher::HandlerRequest;
use crate::handler::{HandlerResult, RequestHandler};

pub trait Middleware: Send + Sync {
    /// Process a request, with `next` standing in for the rest of the chain.
    ///
    /// A unit may call `next` once (continue), not at all (short-circuit
    /// with its own response), or several times.
    fn process(&self, req: HandlerRequest, next: &mut dyn RequestHandler) -> HandlerResult;
}
