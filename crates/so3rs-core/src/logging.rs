//! Structured logging setup
//!
//! Kernels emit `tracing` events and spans unconditionally; installing a
//! subscriber is up to the application. With the `subscriber` feature this
//! module provides a ready-made one.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default `so3rs_kernels=info,warn`)
//! - `SO3RS_LOG_FORMAT`: `pretty` (default), `json` or `compact`
//!
//! # Example
//!
//! ```ignore
//! use so3rs_core::logging::{init_logging, LogConfig};
//!
//! init_logging(LogConfig::default())?;
//! ```

/// Output format of the subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One JSON object per event
    Json,
    /// Single line per event
    Compact,
}

impl LogFormat {
    /// Parse a format name, defaulting to [`LogFormat::Pretty`]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format
    pub format: LogFormat,
    /// `EnvFilter` directive
    pub filter: String,
    /// ANSI colors (ignored for JSON)
    pub with_ansi: bool,
    /// Show thread ids, useful when the host backend runs batch-parallel
    pub with_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        let format = std::env::var("SO3RS_LOG_FORMAT")
            .map(|s| LogFormat::parse(&s))
            .unwrap_or(LogFormat::Pretty);
        let filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "so3rs_kernels=info,warn".to_string());

        Self {
            format,
            filter,
            with_ansi: true,
            with_thread_ids: false,
        }
    }
}

/// Install a global `tracing` subscriber
///
/// Call once at startup; a second call fails because a global subscriber
/// is already set.
#[cfg(feature = "subscriber")]
pub fn init_logging(config: LogConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let filter = EnvFilter::try_new(&config.filter)?;
    let registry = tracing_subscriber::registry();

    match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(config.with_ansi)
                    .with_thread_ids(config.with_thread_ids)
                    .with_filter(filter),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_thread_ids(config.with_thread_ids)
                    .with_filter(filter),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(config.with_ansi)
                    .with_thread_ids(config.with_thread_ids)
                    .with_filter(filter),
            )
            .try_init()?,
    }

    Ok(())
}

/// No-op when the `subscriber` feature is disabled
#[cfg(not(feature = "subscriber"))]
pub fn init_logging(_config: LogConfig) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }
}
