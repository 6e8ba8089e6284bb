use thiserror::Error;

/// Fallback shown when the analyzer rejects a resume without a `detail`.
pub const GENERIC_REJECTION: &str = "Analysis failed";

/// Everything that can stop a submission from producing a report.
///
/// Each variant carries a stable machine code and a user-facing message so the
/// view never has to format raw transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("No resume file selected")]
    NoFileSelected,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Analysis rejected (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Malformed report: {0}")]
    MalformedReport(String),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::NoFileSelected => "NO_FILE_SELECTED",
            AnalysisError::Network(_) => "NETWORK_ERROR",
            AnalysisError::Rejected { .. } => "ANALYSIS_REJECTED",
            AnalysisError::MalformedReport(_) => "MALFORMED_REPORT",
        }
    }

    /// Text shown to the user. Server-provided details are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::NoFileSelected => {
                "Please select a resume file (PDF or DOCX).".to_string()
            }
            AnalysisError::Network(msg) => {
                tracing::debug!("Network error surfaced to user: {msg}");
                "Error analyzing resume. Please try again.".to_string()
            }
            AnalysisError::Rejected { detail, .. } => detail.clone(),
            AnalysisError::MalformedReport(msg) => {
                tracing::debug!("Malformed report surfaced to user: {msg}");
                "The analyzer returned an unreadable report. Please try again.".to_string()
            }
        }
    }

    /// `NoFileSelected` blocks the action; request failures are dismissible notices.
    pub fn is_blocking(&self) -> bool {
        matches!(self, AnalysisError::NoFileSelected)
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_detail_is_shown_verbatim() {
        let err = AnalysisError::Rejected {
            status: 500,
            detail: "unsupported file type".to_string(),
        };
        assert_eq!(err.user_message(), "unsupported file type");
        assert_eq!(err.code(), "ANALYSIS_REJECTED");
    }

    #[test]
    fn test_network_error_hides_transport_details() {
        let err = AnalysisError::Network("connection refused (os error 111)".to_string());
        assert_eq!(
            err.user_message(),
            "Error analyzing resume. Please try again."
        );
        assert!(!err.is_blocking());
    }

    #[test]
    fn test_no_file_selected_is_blocking() {
        let err = AnalysisError::NoFileSelected;
        assert!(err.is_blocking());
        assert_eq!(err.code(), "NO_FILE_SELECTED");
        assert!(err.user_message().contains("select a resume file"));
    }
}
