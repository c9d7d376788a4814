mod parsing;
mod settings;
mod types;

pub use types::{
    ConfigError, Environment, PeerReviewSettings, RuntimeSettings, Settings, SubmissionSettings,
    TelemetrySettings,
};
