use super::parsing::{
    env_flag, env_number, env_optional, env_or_default, parse_bool, parse_environment,
    parse_extension_list,
};
use super::types::{
    ConfigError, Environment, PeerReviewSettings, RuntimeSettings, Settings, SubmissionSettings,
    TelemetrySettings,
};

const DEFAULT_ALLOWED_FILE_TYPES: &[&str] = &["pdf", "docx", "txt", "zip"];
const DEFAULT_MAX_FILES: u32 = 5;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
const DEFAULT_MAX_CONTENT_LENGTH: usize = 100_000;
const DEFAULT_REVIEWS_REQUIRED: u32 = 2;
const DEFAULT_MAX_REVIEWS_PER_REVIEWER: u32 = 5;

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(
            env_optional("COURSEWORK_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("COURSEWORK_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let submissions = SubmissionSettings {
            default_max_files: env_number("DEFAULT_MAX_FILES", DEFAULT_MAX_FILES)?,
            default_max_file_size_mb: env_number(
                "DEFAULT_MAX_FILE_SIZE_MB",
                DEFAULT_MAX_FILE_SIZE_MB,
            )?,
            default_allowed_file_types: parse_extension_list(
                env_optional("DEFAULT_ALLOWED_FILE_TYPES"),
                DEFAULT_ALLOWED_FILE_TYPES,
            ),
            max_content_length: env_number("MAX_CONTENT_LENGTH", DEFAULT_MAX_CONTENT_LENGTH)?,
        };

        let peer_review = PeerReviewSettings {
            default_reviews_required: env_number(
                "DEFAULT_REVIEWS_REQUIRED",
                DEFAULT_REVIEWS_REQUIRED,
            )?,
            max_reviews_per_reviewer: env_number(
                "MAX_REVIEWS_PER_REVIEWER",
                DEFAULT_MAX_REVIEWS_PER_REVIEWER,
            )?,
        };

        let telemetry = TelemetrySettings {
            log_level: env_or_default("COURSEWORK_LOG_LEVEL", "info"),
            json: env_flag("COURSEWORK_LOG_JSON"),
            prometheus_enabled: env_flag("PROMETHEUS_ENABLED"),
        };

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            submissions,
            peer_review,
            telemetry,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn submissions(&self) -> &SubmissionSettings {
        &self.submissions
    }

    pub fn peer_review(&self) -> &PeerReviewSettings {
        &self.peer_review
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    #[cfg(test)]
    pub(crate) fn peer_review_mut(&mut self) -> &mut PeerReviewSettings {
        &mut self.peer_review
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.submissions.default_allowed_file_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_ALLOWED_FILE_TYPES",
                value: String::from("<empty>"),
            });
        }

        if self.submissions.default_max_file_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_MAX_FILE_SIZE_MB",
                value: "0".to_string(),
            });
        }

        if self.submissions.max_content_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_CONTENT_LENGTH",
                value: "0".to_string(),
            });
        }

        if self.peer_review.default_reviews_required == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_REVIEWS_REQUIRED",
                value: "0".to_string(),
            });
        }

        if self.peer_review.max_reviews_per_reviewer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_REVIEWS_PER_REVIEWER",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.telemetry.log_level.eq_ignore_ascii_case("trace") {
            return Err(ConfigError::InvalidValue {
                field: "COURSEWORK_LOG_LEVEL",
                value: self.telemetry.log_level.clone(),
            });
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime: RuntimeSettings { environment: Environment::Development, strict_config: false },
            submissions: SubmissionSettings {
                default_max_files: DEFAULT_MAX_FILES,
                default_max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
                default_allowed_file_types: DEFAULT_ALLOWED_FILE_TYPES
                    .iter()
                    .map(|item| item.to_string())
                    .collect(),
                max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            },
            peer_review: PeerReviewSettings {
                default_reviews_required: DEFAULT_REVIEWS_REQUIRED,
                max_reviews_per_reviewer: DEFAULT_MAX_REVIEWS_PER_REVIEWER,
            },
            telemetry: TelemetrySettings {
                log_level: "info".to_string(),
                json: false,
                prometheus_enabled: false,
            },
        }
    }
}
