//! Tests for the queue traversal engine.
//!
//! Coverage mirrors the dispatcher's contract:
//! - entries run in queue order, each at most once per top-level dispatch
//! - strict before/after nesting through recursive self-invocation
//! - wholesale queue replacement resets the cursor
//! - cursor-relative insertion, including from inside a running unit
//! - edge policies: empty-configure rejection, exhausted-insert no-op,
//!   invalid entries, re-dispatch after exhaustion

use conveyor::{
    DispatchError, Dispatcher, HandlerRequest, HandlerResponse, HandlerResult, Middleware,
    QueueEntry, RequestHandler,
};
use http::Method;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

mod tracing_util;
use tracing_util::TestTracing;

type OrderLog = Arc<Mutex<Vec<String>>>;

fn new_log() -> OrderLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn create_test_request(method: Method, path: &str) -> HandlerRequest {
    HandlerRequest::new(method, path)
}

/// Terminal handler that records its invocation and answers 200.
fn recording_terminal(log: OrderLog) -> impl FnMut(HandlerRequest) -> HandlerResult + Send {
    move |_req: HandlerRequest| -> HandlerResult {
        log.lock().push("terminal".to_string());
        Ok(HandlerResponse::json(200, json!({ "via": "terminal" })))
    }
}

/// A unit that records its name and continues down the chain.
fn step(name: &'static str, log: &OrderLog) -> QueueEntry {
    let log = Arc::clone(log);
    QueueEntry::func(move |req, next| {
        log.lock().push(name.to_string());
        next.handle(req)
    })
}

/// A unit that records its name and short-circuits with 204.
fn halt(name: &'static str, log: &OrderLog) -> QueueEntry {
    let log = Arc::clone(log);
    QueueEntry::func(move |_req, _next| {
        log.lock().push(name.to_string());
        Ok(HandlerResponse::json(204, Value::Null))
    })
}

/// Middleware that records entry and exit around the rest of the chain.
struct RecordingMiddleware {
    name: &'static str,
    log: OrderLog,
}

impl Middleware for RecordingMiddleware {
    fn process(&self, req: HandlerRequest, next: &mut dyn RequestHandler) -> HandlerResult {
        self.log.lock().push(format!("{}-before", self.name));
        let res = next.handle(req)?;
        self.log.lock().push(format!("{}-after", self.name));
        Ok(res)
    }
}

#[test]
fn test_dispatch_invokes_entries_in_order() {
    let _tracing = TestTracing::init();
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![step("a", &log), step("b", &log), step("c", &log)])
        .unwrap();

    let res = dispatcher
        .handle(create_test_request(Method::GET, "/pets"))
        .unwrap();

    assert_eq!(res.status, 200);
    // Strictly increasing order, each entry exactly once.
    assert_eq!(*log.lock(), vec!["a", "b", "c", "terminal"]);
    assert!(dispatcher.is_exhausted());
}

#[test]
fn test_empty_dispatcher_delegates_to_terminal() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));

    let res = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(*log.lock(), vec!["terminal"]);
}

#[test]
fn test_set_queue_with_empty_vec_is_rejected() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log));

    let err = dispatcher.set_queue(Vec::new()).unwrap_err();

    assert!(matches!(err, DispatchError::EmptyQueue));
    assert_eq!(err.to_string(), "middleware queue cannot be empty");
}

#[test]
fn test_set_queue_resets_cursor() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![halt("halt", &log), step("unreached", &log)])
        .unwrap();

    // First dispatch short-circuits at the halt unit, leaving the cursor
    // parked mid-queue.
    let res = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert_eq!(res.status, 204);
    assert_eq!(dispatcher.cursor(), 1);
    assert!(!dispatcher.is_exhausted());

    dispatcher.set_queue(vec![step("fresh", &log)]).unwrap();
    assert_eq!(dispatcher.cursor(), 0);

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert_eq!(*log.lock(), vec!["halt", "fresh", "terminal"]);
}

#[test]
fn test_middleware_nesting_is_strict() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![
            QueueEntry::middleware(RecordingMiddleware {
                name: "middleware1",
                log: log.clone(),
            }),
            QueueEntry::middleware(RecordingMiddleware {
                name: "middleware2",
                log: log.clone(),
            }),
        ])
        .unwrap();

    let res = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(
        *log.lock(),
        vec![
            "middleware1-before",
            "middleware2-before",
            "terminal",
            "middleware2-after",
            "middleware1-after",
        ]
    );
}

#[test]
fn test_short_circuit_skips_rest_of_chain() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![halt("halt", &log), step("unreached", &log)])
        .unwrap();

    let res = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    assert_eq!(res.status, 204);
    assert_eq!(*log.lock(), vec!["halt"]);
}

#[test]
fn test_add_queue_splices_at_cursor_in_given_order() {
    let _tracing = TestTracing::init();
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![halt("first", &log), step("last", &log)])
        .unwrap();

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert_eq!(dispatcher.cursor(), 1);

    dispatcher.add_queue(vec![step("new1", &log), step("new2", &log)]);

    // Spliced ahead of the entry that was about to run, order preserved,
    // cursor reading the first inserted entry.
    assert_eq!(dispatcher.queue_len(), 4);
    assert_eq!(dispatcher.cursor(), 1);

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert_eq!(
        *log.lock(),
        vec!["first", "new1", "new2", "last", "terminal"]
    );
}

#[test]
fn test_unit_can_inject_entries_after_itself() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));

    let injected = step("injected", &log);
    let outer_log = log.clone();
    let outer = QueueEntry::func(move |req, next| {
        outer_log.lock().push("outer".to_string());
        if let Some(dispatcher) = next.as_dispatcher() {
            dispatcher.add_queue(vec![injected.clone()]);
        }
        next.handle(req)
    });

    dispatcher
        .set_queue(vec![outer, step("after", &log)])
        .unwrap();

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    // The injected unit runs immediately after the unit that added it,
    // ahead of the originally-next entry.
    assert_eq!(*log.lock(), vec!["outer", "injected", "after", "terminal"]);
}

#[test]
fn test_add_queue_on_exhausted_queue_is_a_noop() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher.set_queue(vec![step("a", &log)]).unwrap();

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert!(dispatcher.is_exhausted());

    dispatcher.add_queue(vec![step("ghost", &log)]);

    assert_eq!(dispatcher.queue_len(), 1);
    assert!(dispatcher.is_exhausted());

    // The ignored entry never executes on a later dispatch either.
    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert_eq!(*log.lock(), vec!["a", "terminal", "terminal"]);
}

#[test]
fn test_add_queue_with_empty_vec_does_nothing() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![halt("halt", &log), step("b", &log)])
        .unwrap();

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    dispatcher.add_queue(Vec::new());

    assert_eq!(dispatcher.queue_len(), 2);

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    assert_eq!(*log.lock(), vec!["halt", "b", "terminal"]);
}

#[test]
fn test_named_entry_without_resolver_is_invalid() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher
        .set_queue(vec![QueueEntry::named("auth"), step("unreached", &log)])
        .unwrap();

    let err = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap_err();

    assert!(matches!(&err, DispatchError::InvalidEntry { entry } if entry.contains("auth")));
    let msg = err.to_string();
    assert!(msg.contains("named entry \"auth\""), "message was: {msg}");
    assert!(msg.contains("Middleware"), "message was: {msg}");
    assert!(log.lock().is_empty());
}

#[test]
fn test_unit_errors_propagate_unmodified() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    let failing =
        QueueEntry::func(|_req, _next| Err(DispatchError::Handler("backend unavailable".into())));
    dispatcher
        .set_queue(vec![step("a", &log), failing])
        .unwrap();

    let err = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap_err();

    assert!(matches!(err, DispatchError::Handler(_)));
    assert_eq!(err.to_string(), "handler error: backend unavailable");
    assert_eq!(*log.lock(), vec!["a"]);
}

#[test]
fn test_dispatch_after_exhaustion_reinvokes_terminal() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));
    dispatcher.set_queue(vec![step("a", &log)]).unwrap();

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();
    let res = dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    // The cursor stays exhausted; every further dispatch goes straight to
    // the terminal handler.
    assert_eq!(res.status, 200);
    assert_eq!(*log.lock(), vec!["a", "terminal", "terminal"]);
}

#[test]
fn test_reentrant_next_calls_always_progress_forward() {
    let log = new_log();
    let mut dispatcher = Dispatcher::new(recording_terminal(log.clone()));

    let double_log = log.clone();
    let double = QueueEntry::func(move |req, next| {
        double_log.lock().push("double".to_string());
        let _first = next.handle(req.clone())?;
        next.handle(req)
    });

    dispatcher.set_queue(vec![double, step("b", &log)]).unwrap();

    dispatcher
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    // The second invocation of the chain finds the queue already drained:
    // consumed entries are never re-processed.
    assert_eq!(*log.lock(), vec!["double", "b", "terminal", "terminal"]);
}

#[test]
fn test_dispatcher_composes_as_terminal_handler() {
    let log = new_log();

    let mut inner = Dispatcher::new(recording_terminal(log.clone()));
    inner.set_queue(vec![step("inner", &log)]).unwrap();

    let mut outer = Dispatcher::new(inner);
    outer.set_queue(vec![step("outer", &log)]).unwrap();

    let res = outer
        .handle(create_test_request(Method::GET, "/"))
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(*log.lock(), vec!["outer", "inner", "terminal"]);
}
