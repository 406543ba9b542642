//! Logging configuration for inject
//!
//! Easy setup for structured logging with support for both JSON (production)
//! and pretty (development) output formats.
//!
//! # Features
//!
//! - `logging` - Enable debug logging (default)
//! - `logging-json` - Use JSON structured output (recommended for production)
//! - `logging-pretty` - Use colorful pretty output (recommended for development)
//!
//! # Example
//!
//! ```rust,ignore
//! use inject::logging;
//!
//! // Initialize with default settings
//! logging::init();
//!
//! // Or use the builder for custom configuration
//! logging::builder()
//!     .trace()
//!     .inject_only()
//!     .pretty()
//!     .init();
//! ```

#[cfg(feature = "logging")]
use tracing::Level;

#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
use once_cell::sync::OnceCell;

/// Guard so repeated init calls (e.g. from several tests) stay a no-op
/// instead of panicking on double subscriber installation.
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
static INSTALLED: OnceCell<()> = OnceCell::new();

/// Logging format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging (production default)
    #[default]
    Json,
    /// Pretty colorful output (development)
    Pretty,
    /// Compact single-line output
    Compact,
}

/// Builder for logging configuration
#[cfg(feature = "logging")]
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_thread_ids: bool,
}

#[cfg(feature = "logging")]
impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            with_thread_ids: false,
        }
    }
}

#[cfg(feature = "logging")]
impl LoggingBuilder {
    /// Create a new logging builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set log level to TRACE (most verbose)
    pub fn trace(mut self) -> Self {
        self.level = Level::TRACE;
        self
    }

    /// Set log level to DEBUG
    pub fn debug(mut self) -> Self {
        self.level = Level::DEBUG;
        self
    }

    /// Set log level to INFO
    pub fn info(mut self) -> Self {
        self.level = Level::INFO;
        self
    }

    /// Filter to only show logs from a specific target
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show inject's own logs
    pub fn inject_only(self) -> Self {
        self.with_target_filter("inject")
    }

    /// Include thread IDs in log output
    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    /// Use JSON structured logging format
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Use pretty colorful logging format
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Use compact single-line logging format
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Initialize the logging subscriber with the configured settings.
    ///
    /// Requires either `logging-json` or `logging-pretty`. Idempotent: later
    /// calls are ignored once a subscriber is installed.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        INSTALLED.get_or_init(|| {
            let filter = if let Some(target) = self.target {
                EnvFilter::new(format!("{}={}", target, self.level))
            } else {
                EnvFilter::new(self.level.to_string())
            };

            match self.format {
                LogFormat::Json => {
                    #[cfg(feature = "logging-json")]
                    {
                        let subscriber = fmt::layer()
                            .json()
                            .with_thread_ids(self.with_thread_ids)
                            .with_target(true);

                        tracing_subscriber::registry()
                            .with(filter)
                            .with(subscriber)
                            .init();
                    }
                    #[cfg(not(feature = "logging-json"))]
                    {
                        // Fall back to plain formatting if json not enabled
                        let subscriber = fmt::layer()
                            .with_thread_ids(self.with_thread_ids)
                            .with_target(true);

                        tracing_subscriber::registry()
                            .with(filter)
                            .with(subscriber)
                            .init();
                    }
                }
                LogFormat::Pretty => {
                    let subscriber = fmt::layer()
                        .pretty()
                        .with_thread_ids(self.with_thread_ids)
                        .with_target(true);

                    tracing_subscriber::registry()
                        .with(filter)
                        .with(subscriber)
                        .init();
                }
                LogFormat::Compact => {
                    let subscriber = fmt::layer()
                        .compact()
                        .with_thread_ids(self.with_thread_ids)
                        .with_target(true);

                    tracing_subscriber::registry()
                        .with(filter)
                        .with(subscriber)
                        .init();
                }
            }
        });
    }

    /// Initialize (no-op when subscriber features not available)
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {
        // No-op: tracing-subscriber not enabled. Use the logging-json or
        // logging-pretty feature.
    }
}

/// Create a new logging builder
#[cfg(feature = "logging")]
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize logging with default settings.
///
/// Uses JSON format if `logging-json` is enabled, otherwise pretty format
/// when `logging-pretty` is enabled.
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init() {
    #[cfg(feature = "logging-json")]
    {
        init_json();
    }
    #[cfg(all(feature = "logging-pretty", not(feature = "logging-json")))]
    {
        init_pretty();
    }
}

/// Initialize logging (no-op when subscriber features not available)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init() {
    // No-op: requires logging-json or logging-pretty feature
}

/// Initialize JSON structured logging
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_json() {
    builder().json().debug().init();
}

/// Initialize JSON logging (no-op when not available)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_json() {
    // No-op: requires logging-json or logging-pretty feature
}

/// Initialize pretty colorful logging
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_pretty() {
    builder().pretty().debug().init();
}

/// Initialize pretty logging (no-op when not available)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_pretty() {
    // No-op: requires logging-json or logging-pretty feature
}
