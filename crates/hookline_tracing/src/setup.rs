//! Subscriber setup.
//!
//! [`TracingSetup`] installs a `tracing` subscriber for hosts that do not
//! bring their own. hookline itself only emits events; nothing is printed
//! until a subscriber is installed.
//!
//! # Example
//!
//! ```
//! use hookline_tracing::setup::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output, hook dispatch at trace level
//! let dev = TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_env_filter("hookline_hooks=trace,hookline_manager=debug");
//!
//! // Production: JSON lines for log aggregation
//! let prod = TracingSetup::new()
//!     .with_level(Level::INFO)
//!     .with_format(TracingFormat::Json);
//!
//! let config = prod.init();
//! assert_eq!(config.format, TracingFormat::Json);
//! # let _ = dev;
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// The settings a [`TracingSetup`] was initialized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum log level used when no filter is given.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// The filter directives in effect.
    pub filter: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    level: Level,
    format: TracingFormat,
    /// Filter directives, e.g. `"hookline_manager=debug,hookline_hooks=trace"`.
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a setup with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives, `target=level,target=level,...`.
    ///
    /// Directives that fail to parse fall back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The settings this setup would install.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
            filter: self.filter_directives(),
        }
    }

    fn filter_directives(&self) -> String {
        match &self.env_filter {
            Some(filter) if EnvFilter::try_new(filter).is_ok() => filter.clone(),
            _ => self.level.as_str().to_ascii_lowercase(),
        }
    }

    /// Installs the subscriber.
    ///
    /// A subscriber that is already installed is left in place.
    pub fn init(&self) -> TracingConfig {
        let config = self.config();
        let env_filter = EnvFilter::new(&config.filter);
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        };

        if installed.is_ok() {
            tracing::info!(
                level = %config.level,
                format = ?config.format,
                filter = %config.filter,
                "hookline tracing initialized"
            );
        }
        config
    }
}
