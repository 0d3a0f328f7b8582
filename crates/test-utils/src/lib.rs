//! Shared helpers for `buildtail` integration tests.

pub mod builders;
pub mod fake_process;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use buildtail::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for a whole session under test.
pub const SESSION_TEST_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Install a test-captured subscriber once per test binary.
///
/// Output only shows for failing tests (or with `--nocapture`). The filter
/// is read from `BUILDTAIL_LOG` using `EnvFilter` syntax, e.g.
/// `BUILDTAIL_LOG=buildtail::engine=trace`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("buildtail=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`SESSION_TEST_TIMEOUT`].
///
/// Under paused Tokio time the limit is virtual, so a session that never
/// finishes fails fast instead of hanging the suite.
pub async fn with_timeout<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(SESSION_TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("session did not finish within {SESSION_TEST_TIMEOUT:?}"))
}
