//! Assignment and submission lifecycle with a grading engine: late-penalty
//! accounting, rubric-weighted scoring, peer review and read-only statistics.

pub mod core;
pub mod domain;
pub mod repositories;
pub mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use crate::core::config::Settings;
use crate::core::telemetry;

/// Loads `.env` and the environment, then installs logging and metrics.
pub fn init() -> anyhow::Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    crate::core::metrics::init(&settings)?;

    tracing::info!(
        environment = %settings.runtime().environment.as_str(),
        prometheus = settings.telemetry().prometheus_enabled,
        "Coursework core initialised"
    );
    Ok(settings)
}
