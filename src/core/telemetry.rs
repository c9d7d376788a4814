use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// `RUST_LOG` wins when set; otherwise the configured level applies to this
/// crate and dependencies stay at `warn`.
fn filter_directive(settings: &Settings) -> String {
    let level = settings.telemetry().log_level.to_ascii_lowercase();
    format!("warn,coursework_core={level}")
}

pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(settings)))?;

    let result = if settings.telemetry().json {
        fmt().with_env_filter(filter).json().flatten_event(true).with_current_span(false).try_init()
    } else {
        fmt().with_env_filter(filter).compact().with_target(false).try_init()
    };
    result.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
