//! Logging configuration
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry::Registry};

#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("a global subscriber is already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs a global `tracing` subscriber.
///
/// The `RUST_LOG` environment variable takes precedence over `level` and `filter`.
/// Only one subscriber can be installed per process: calling [`LogConfig::init`] a second
/// time returns [`LogError::Init`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filters logs using the [`EnvFilter`] format
    pub filter: String,
    /// Filters out logs that are "less than" the given level.
    /// This can be further filtered using the `filter` setting.
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: String::new(),
            level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Directives used when `RUST_LOG` is not set
    pub fn directives(&self) -> String {
        if self.filter.is_empty() {
            self.level.to_string()
        } else {
            format!("{},{}", self.level, self.filter)
        }
    }

    pub fn init(&self) -> Result<(), LogError> {
        let filter_layer = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directives()))?;
        let fmt_layer = fmt::Layer::default().with_writer(std::io::stderr);
        Registry::default()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init()?;
        Ok(())
    }
}
