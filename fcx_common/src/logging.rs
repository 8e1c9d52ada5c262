//! Ambient logging setup shared by the driver and by integration tests.
//!
//! Library crates (`fcx_lexer`, `fcx_parser`, ...) only ever call the `log`
//! macros; only this helper (invoked by `fcx_driver` or a test harness)
//! installs a subscriber, so embedders keep control of where log lines go.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs `env_logger` exactly once per process. Safe to call repeatedly
/// (from multiple tests in the same binary, for instance).
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();
    });
}
