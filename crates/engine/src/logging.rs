//! Logging initialization and configuration.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset. sqlx logs every statement at info.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},sqlx=warn"))
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `logging.level`. Any format other than
/// `json` selects the human-readable output. Fails if a global subscriber
/// is already installed, which is expected when the engine is embedded in a
/// host that configures tracing itself.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true);
            subscriber.with(json_layer).try_init()
        }
        _ => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true);
            subscriber.with(pretty_layer).try_init()
        }
    }
}
