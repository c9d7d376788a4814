use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    Essay,
    FileUpload,
    Project,
    Presentation,
    Research,
    Practical,
    Portfolio,
}

impl AssignmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Essay => "essay",
            Self::FileUpload => "file_upload",
            Self::Project => "project",
            Self::Presentation => "presentation",
            Self::Research => "research",
            Self::Practical => "practical",
            Self::Portfolio => "portfolio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    InProgress,
    Submitted,
    LateSubmission,
    UnderReview,
    Graded,
    Returned,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::LateSubmission => "late_submission",
            Self::UnderReview => "under_review",
            Self::Graded => "graded",
            Self::Returned => "returned",
        }
    }

    /// Handed in and not yet picked up by an instructor.
    pub fn is_awaiting_grading(self) -> bool {
        matches!(self, Self::Submitted | Self::LateSubmission)
    }

    /// The student can still change content and attachments.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::InProgress | Self::Returned)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    NotGraded,
    InProgress,
    Completed,
    NeedsRevision,
}

impl GradeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotGraded => "not_graded",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::NeedsRevision => "needs_revision",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

const LETTER_BANDS: &[(f64, LetterGrade)] = &[
    (95.0, LetterGrade::APlus),
    (90.0, LetterGrade::A),
    (85.0, LetterGrade::AMinus),
    (80.0, LetterGrade::BPlus),
    (75.0, LetterGrade::B),
    (70.0, LetterGrade::BMinus),
    (65.0, LetterGrade::CPlus),
    (60.0, LetterGrade::C),
    (55.0, LetterGrade::CMinus),
    (50.0, LetterGrade::D),
];

impl LetterGrade {
    pub fn from_percentage(percentage: f64) -> Self {
        LETTER_BANDS
            .iter()
            .find(|(threshold, _)| percentage >= *threshold)
            .map(|(_, letter)| *letter)
            .unwrap_or(LetterGrade::F)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
