use std::env;

use tracing::Level;

/// Initialize tracing for the application.
///
/// The level comes from the `CHATRELAY_LOG` environment variable when set,
/// otherwise from `default_level`; anything unparseable falls back to INFO.
pub fn init(default_level: &str) {
    let level = env::var("CHATRELAY_LOG")
        .ok()
        .as_deref()
        .unwrap_or(default_level)
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    // try_init so tests can call this repeatedly without panicking
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
