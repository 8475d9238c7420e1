// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Lightweight structured logging shared by every h5bucket crate
//!
//! Usage:
//! - Set H5BUCKET_LOG=off (default) - no logs
//! - Set H5BUCKET_LOG=info - dataset load/save/exists calls
//! - Set H5BUCKET_LOG=debug - resolved paths, image sizes, store keys

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "H5BUCKET_LOG";

static INIT: Once = Once::new();

/// Parse an `H5BUCKET_LOG` value. `None` means logging is off.
///
/// Unknown values fall back to `Info`.
pub fn parse_level(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "error" => Some(emit::Level::Error),
        "warn" => Some(emit::Level::Warn),
        "debug" => Some(emit::Level::Debug),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics from the `H5BUCKET_LOG` environment variable
///
/// Call once at application startup; later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let Some(level) = parse_level(&value) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive every emitter in the process.
        std::mem::forget(rt);
    });
}

pub use init_diagnostics as init;

/// Operations a user wants to see: "Saved dataset", "Loaded 3 rows"
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Resolved paths, byte counts, option values
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable surprises, e.g. load and save versions diverging
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures about to be returned to the caller
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_level() {
        assert!(parse_level("off").is_none());
        assert!(parse_level("").is_none());
        assert_eq!(parse_level("DEBUG"), Some(emit::Level::Debug));
        assert_eq!(parse_level("warn"), Some(emit::Level::Warn));
        assert_eq!(parse_level("error"), Some(emit::Level::Error));
        assert_eq!(parse_level("chatty"), Some(emit::Level::Info));
    }

    #[test]
    fn test_macros_compile() {
        info!("Test message");
        debug!("Debug message with {value}", value: 42);
        warn!("Warning message");
        error!("Error message");
    }
}
