//! Name-keyed middleware storage, the lookup backend behind
//! [`ProviderResolver`](crate::resolver::ProviderResolver).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::middleware::Middleware;

/// Error returned by a [`MiddlewareProvider`] lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No middleware is registered under the requested name
    NotFound {
        /// The name that was looked up
        name: String,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound { name } => {
                write!(f, "no middleware registered under name \"{}\"", name)
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Lookup backend for named middleware.
///
/// The resolver treats a failed lookup as a skip; the error only reaches
/// callers that use the provider directly.
pub trait MiddlewareProvider: Send + Sync {
    /// Fetch the middleware registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when nothing is registered under
    /// `name`.
    fn get(&self, name: &str) -> Result<Arc<dyn Middleware>, LookupError>;
}

/// In-memory middleware registry keyed by name.
#[derive(Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register middleware under the given name.
    ///
    /// If the name is already taken the previous registration is replaced
    /// and dropped.
    pub fn register(&mut self, name: impl Into<String>, middleware: Arc<dyn Middleware>) {
        let name = name.into();
        if self.entries.insert(name.clone(), middleware).is_some() {
            warn!(name = %name, "replaced existing middleware registration");
        } else {
            info!(
                name = %name,
                total = self.entries.len(),
                "middleware registered"
            );
        }
    }

    /// Whether anything is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MiddlewareProvider for MiddlewareRegistry {
    fn get(&self, name: &str) -> Result<Arc<dyn Middleware>, LookupError> {
        self.entries
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| LookupError::NotFound {
                name: name.to_string(),
            })
    }
}
