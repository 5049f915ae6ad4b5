//! Logging and tracing initialization.
//!
//! Call one of the init functions once at startup, before creating the
//! [`App`](crate::App). The log level is controlled by the `RUST_LOG`
//! environment variable:
//!
//! ```bash
//! # Show all logs including request traces
//! RUST_LOG=debug cargo run
//!
//! # Show only warnings and errors (production)
//! RUST_LOG=warn cargo run
//!
//! # Fine-grained control
//! RUST_LOG=ems_backend=debug,tower_http=debug cargo run
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with sensible defaults.
///
/// Uses `RUST_LOG` when set, otherwise `info`. Formatted output to stdout.
///
/// # Panics
///
/// Panics if called multiple times. Only call it once at application startup.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize logging with a specific log level instead of `RUST_LOG`.
///
/// `RUST_LOG` still wins when it is set explicitly.
///
/// # Panics
///
/// Panics if called multiple times. Only call it once at application startup.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging (recommended for production).
///
/// # Panics
///
/// Panics if called multiple times. Only call it once at application startup.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
