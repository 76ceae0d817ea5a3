//! Logging utilities and configuration for term-analyze.
//!
//! Library code only emits `tracing` events. Installing a subscriber is left
//! to the application; [`setup::init_logging`] is the one the bundled
//! command-line tool uses.

/// Controls how chatty each pipeline stage is.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether to log per-column preprocessing details
    pub log_column_details: bool,
    /// Whether to log load and write operations
    pub log_data_operations: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_column_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            log_column_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration with the lowest overhead.
    pub fn quiet() -> Self {
        Self {
            log_column_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }
}

/// Macro for conditional per-column logging.
#[macro_export]
macro_rules! log_column {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_column_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional data operation logging.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Utilities for installing a `tracing` subscriber.
pub mod setup {
    use tracing::Level;

    /// Configuration for the process-wide subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for dependencies
        pub level: Level,
        /// Log level for term-analyze itself
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Sets the log level for term-analyze components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},term_analyze={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Initializes logging to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_analyze::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::default().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
