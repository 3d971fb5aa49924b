use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,sql_chat_console=debug";

/// Initialize structured logging.
///
/// `RUST_LOG` controls levels; `format` picks between the compact human
/// formatter and one JSON object per line.
pub fn init(format: LogFormat) {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter_layer);

    match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_target(true).json())
            .init(),
    }
}
