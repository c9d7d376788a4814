use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) submissions: SubmissionSettings,
    pub(super) peer_review: PeerReviewSettings,
    pub(super) telemetry: TelemetrySettings,
}

/// Defaults applied when an assignment request leaves submission limits out.
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub default_max_files: u32,
    pub default_max_file_size_mb: u64,
    pub default_allowed_file_types: Vec<String>,
    pub max_content_length: usize,
}

#[derive(Debug, Clone)]
pub struct PeerReviewSettings {
    pub default_reviews_required: u32,
    pub max_reviews_per_reviewer: u32,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
    pub prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
    pub strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
