//! Process-wide logging.
//!
//! Events go to stderr so stdout only ever carries replies.

use tracing_subscriber::filter::Filtered;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{Configuration, LogFormat};
use crate::Result;

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG`, when set, replaces the configured filter. Fails if a subscriber is already
/// installed.
pub fn init_logging(config: &Configuration) -> Result<()> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(&config.log_filter, from_env.as_deref())?;
    tracing_subscriber::registry()
        .with(build_layer(config.log_format, filter))
        .try_init()?;
    Ok(())
}

fn build_filter(configured: &str, from_env: Option<&str>) -> Result<EnvFilter> {
    let directives = match from_env {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => configured,
    };
    Ok(EnvFilter::try_new(directives)?)
}

#[allow(clippy::type_complexity)]
fn build_layer<S>(
    format: LogFormat,
    filter: EnvFilter,
) -> Filtered<Box<dyn Layer<S> + Send + Sync>, EnvFilter, S>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed()
            .with_filter(filter),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed()
            .with_filter(filter),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .boxed()
            .with_filter(filter),
    }
}
