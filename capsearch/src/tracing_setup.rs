//! Optional tracing subscriber setup.
//!
//! Library code only emits `tracing` events; binaries and tests decide where
//! they go. `RUST_LOG` takes precedence over the level passed in.
//!
//! ```text
//! RUST_LOG=capsearch=debug capsearch --index v1=talk.vtt --phrase "hello world"
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "capsearch";

/// Environment variable consulted by [`level_from_env`].
pub const ENV_LOG_LEVEL: &str = "CAPSEARCH_LOG_LEVEL";

/// Parse a log level string (case-insensitive).
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// `CAPSEARCH_LOG_LEVEL` if set and valid, else `default`.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var(ENV_LOG_LEVEL)
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

/// Filter directives used when `RUST_LOG` is unset
fn default_directives(level: Level) -> String {
    format!("warn,{TARGET_PREFIX}={}", level.as_str().to_lowercase())
}

/// Install a stderr fmt subscriber. Returns false if one was already set.
pub fn init_tracing(level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("Debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("WARN"), Some(Level::WARN));
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(Level::DEBUG), "warn,capsearch=debug");
        assert_eq!(default_directives(Level::INFO), "warn,capsearch=info");
    }

    #[test]
    fn test_init_twice() {
        init_tracing(Level::WARN);
        assert!(!init_tracing(Level::WARN));
    }
}
