use std::fmt;

/// Boxed error raised by a middleware or terminal handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dispatch error
///
/// Fatal conditions detected while configuring or driving the middleware
/// queue. All variants are raised at the point of detection and propagate
/// to the caller of the top-level dispatch unmodified.
#[derive(Debug)]
pub enum DispatchError {
    /// The queue was configured with zero entries
    ///
    /// An empty queue with a valid cursor would be indistinguishable from an
    /// exhausted one and silently fall through to the terminal handler, so
    /// configuring one is rejected up front.
    EmptyQueue,
    /// A queue entry could not be turned into an invocable unit
    ///
    /// Carries a description of the entry's concrete form. Raised when a
    /// named entry is reached with no resolver configured to look it up.
    InvalidEntry {
        /// Description of the offending entry (e.g. `named entry "auth"`)
        entry: String,
    },
    /// A middleware or the terminal handler failed
    ///
    /// The unit's own error, forwarded without wrapping.
    Handler(BoxError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::EmptyQueue => {
                write!(f, "middleware queue cannot be empty")
            }
            DispatchError::InvalidEntry { entry } => {
                write!(
                    f,
                    "invalid middleware queue entry: {}. An entry must either be callable or \
                    implement Middleware; named entries require a resolver.",
                    entry
                )
            }
            DispatchError::Handler(err) => {
                write!(f, "handler error: {}", err)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        DispatchError::Handler(err)
    }
}
