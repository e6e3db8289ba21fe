//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `default_level`. Safe to call more than
/// once; only the first call installs the logger.
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or(default_level.to_owned());
        if let Err(err) = env_logger::Builder::from_env(env).try_init() {
            eprintln!("logger already installed: {err}");
        }
    });
}

/// Initialize logging for tests (output captured by the test harness)
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
