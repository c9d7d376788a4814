use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateContentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachFileRequest {
    #[serde(alias = "fileId")]
    #[validate(length(min = 1, max = 255, message = "file_id must be 1-255 characters"))]
    pub file_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReturnSubmissionRequest {
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ResubmitRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlagiarismScoreRequest {
    pub score: f64,
}
