use tracing_subscriber::EnvFilter;

/// Installs a thread-default `tracing` subscriber for the duration of a test.
///
/// Output goes through the test writer so it is captured per test; set
/// `RUST_LOG` to see dispatch events when a test fails.
pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        Self {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
