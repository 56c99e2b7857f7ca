// Logging setup (stderr only; stdout carries job output)
use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "rootshell=info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter; `ROOTSHELL_LOG_FORMAT=json`
/// switches from pretty to JSON lines.
pub fn init() -> Result<()> {
    let log_format =
        std::env::var("ROOTSHELL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to install JSON logger")?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to install logger")?;
        }
    }

    Ok(())
}
