use tracing_subscriber::{EnvFilter, fmt};

use podcycle_domain::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Logs go to stderr; stdout carries the report.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    match config.format.as_str() {
        "json" => builder.json().init(),
        _ => builder.init(),
    }
}
