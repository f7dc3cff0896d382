use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        _ => builder.json().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
