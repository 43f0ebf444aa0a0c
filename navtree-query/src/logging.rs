//! Logging infrastructure for navtree.
//!
//! Structured logging is controlled by the `NAVTREE_DEBUG` environment variable.
//!
//! # Environment Variables
//!
//! - `NAVTREE_DEBUG=true` - Enable debug logging
//! - `NAVTREE_DEBUG=1` - Enable debug logging
//! - `NAVTREE_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `NAVTREE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use navtree_query::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//!
//! // Or let navtree.toml decide
//! let config = navtree_query::NavtreeConfig::from_file("navtree.toml").unwrap();
//! logging::init_from_config(&config);
//! ```
//!
//! Within the crate the standard tracing macros are used, e.g.
//! `debug!(model = %name, operations = ops.len(), "building include tree")`.

use std::env;
use std::sync::Once;

use crate::config::NavtreeConfig;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `NAVTREE_DEBUG`.
///
/// Returns `true` if `NAVTREE_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("NAVTREE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `NAVTREE_LOG_LEVEL`.
///
/// Defaults to "debug" if `NAVTREE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("NAVTREE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `NAVTREE_LOG_FORMAT`.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("NAVTREE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the navtree logging system.
///
/// Call once at application startup; subsequent calls are no-ops. Without the
/// `tracing-subscriber` feature this only marks initialization as done and the
/// host application is expected to install its own subscriber.
pub fn init() {
    if !is_debug_enabled() && env::var("NAVTREE_LOG_LEVEL").is_err() {
        INIT.call_once(|| {});
        return;
    }
    install(get_log_level());
}

/// Initialize logging from `navtree.toml`.
///
/// `[debug] log_declarations = true` raises the level to at least `debug`,
/// which is where the tree builder reports each declaration.
pub fn init_from_config(config: &NavtreeConfig) {
    let level = match get_log_level() {
        "trace" => "trace",
        _ if config.debug.log_declarations => "debug",
        level => level,
    };
    install(level);
}

fn install(level: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!("navtree={},navtree_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));
            let registry = tracing_subscriber::registry().with(filter);

            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = get_log_format(), "navtree logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        let _ = level;
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: This should only be called at program startup before threads are spawned.
    unsafe {
        env::set_var("NAVTREE_LOG_LEVEL", level);
    }
    init();
}

/// Initialize logging for debugging (convenience function).
///
/// Equivalent to setting `NAVTREE_DEBUG=true` and calling `init()`.
///
/// # Safety
///
/// Same caveat as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: This should only be called at program startup before threads are spawned.
    unsafe {
        env::set_var("NAVTREE_DEBUG", "true");
    }
    init();
}

/// Debug log that only fires when `NAVTREE_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! navtree_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Trace log that only fires when `NAVTREE_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! navtree_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // SAFETY: both assertions live in one test so no other test races on these vars.
        unsafe {
            env::remove_var("NAVTREE_DEBUG");
            env::remove_var("NAVTREE_LOG_LEVEL");
            env::remove_var("NAVTREE_LOG_FORMAT");
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
        assert_eq!(get_log_format(), "json");
    }
}
