//! Native log output via tracing-subscriber
//!
//! Filter from `RUST_LOG` (default `info`), format from `NFT_MINTER_LOG_FORMAT`
//! (`compact`, `pretty` or `json`). Output goes to stderr.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Some(LogFormat::Compact),
            "pretty" => Some(LogFormat::Pretty),
            "json" | "1" => Some(LogFormat::Json),
            _ => None,
        }
    }

    pub fn from_env() -> Self {
        std::env::var("NFT_MINTER_LOG_FORMAT")
            .ok()
            .and_then(|value| Self::from_str(&value))
            .unwrap_or_default()
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging() {
    init_logging_with(LogFormat::from_env());
}

pub fn init_logging_with(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
