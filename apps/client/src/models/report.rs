//! Report: the analyzer's response, validated strictly at the response boundary.
//!
//! Deserialization goes through `RawReport` (loose JSON types) and `TryFrom`, so a
//! body that is missing a field, uses the wrong type, or breaks a range invariant
//! never becomes a `Report`. Callers only ever see a fully valid value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AnalysisError;

pub const SCORE_MAX: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportSchemaError {
    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

/// The five fixed section presence flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionChecklist {
    pub contact: bool,
    pub summary: bool,
    pub skills: bool,
    pub experience: bool,
    pub education: bool,
}

impl SectionChecklist {
    /// Flags in display order, keyed by their wire names.
    pub fn entries(&self) -> [(&'static str, bool); 5] {
        [
            ("contact", self.contact),
            ("summary", self.summary),
            ("skills", self.skills),
            ("experience", self.experience),
            ("education", self.education),
        ]
    }

    pub fn present_count(&self) -> usize {
        self.entries().iter().filter(|(_, present)| *present).count()
    }
}

/// Immutable analysis result. Construct only via deserialization or `Report::from_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReport")]
pub struct Report {
    pub score: u8,
    pub sections: SectionChecklist,
    pub action_verb_count: u64,
    pub token_count: u64,
    pub readability_score: u8,
    pub suggestions: Vec<String>,
}

/// Wire shape before range checks. Every field is required.
#[derive(Debug, Deserialize)]
struct RawReport {
    score: i64,
    sections: SectionChecklist,
    action_verb_count: i64,
    token_count: i64,
    readability_score: i64,
    suggestions: Vec<String>,
}

impl TryFrom<RawReport> for Report {
    type Error = ReportSchemaError;

    fn try_from(raw: RawReport) -> Result<Self, Self::Error> {
        Ok(Report {
            score: percent("score", raw.score)?,
            sections: raw.sections,
            action_verb_count: count("action_verb_count", raw.action_verb_count)?,
            token_count: count("token_count", raw.token_count)?,
            readability_score: percent("readability_score", raw.readability_score)?,
            suggestions: raw.suggestions,
        })
    }
}

impl Report {
    /// Parses a success-status response body. Any schema violation is a
    /// `MalformedReport`; partial reports are never produced.
    pub fn from_json(body: &[u8]) -> Result<Self, AnalysisError> {
        serde_json::from_slice(body).map_err(|e| AnalysisError::MalformedReport(e.to_string()))
    }
}

fn percent(field: &'static str, value: i64) -> Result<u8, ReportSchemaError> {
    if !(0..=SCORE_MAX).contains(&value) {
        return Err(ReportSchemaError::OutOfRange { field, value });
    }
    u8::try_from(value).map_err(|_| ReportSchemaError::OutOfRange { field, value })
}

fn count(field: &'static str, value: i64) -> Result<u64, ReportSchemaError> {
    u64::try_from(value).map_err(|_| ReportSchemaError::Negative { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario_body() -> serde_json::Value {
        json!({
            "score": 72,
            "sections": {
                "contact": true,
                "summary": false,
                "skills": true,
                "experience": true,
                "education": true
            },
            "action_verb_count": 14,
            "token_count": 430,
            "readability_score": 65,
            "suggestions": ["Add a summary section"]
        })
    }

    fn parse(value: serde_json::Value) -> Result<Report, AnalysisError> {
        Report::from_json(value.to_string().as_bytes())
    }

    #[test]
    fn test_parses_conforming_body() {
        let report = parse(scenario_body()).unwrap();
        assert_eq!(report.score, 72);
        assert!(!report.sections.summary);
        assert_eq!(report.sections.present_count(), 4);
        assert_eq!(report.action_verb_count, 14);
        assert_eq!(report.token_count, 430);
        assert_eq!(report.readability_score, 65);
        assert_eq!(report.suggestions, vec!["Add a summary section"]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut body = scenario_body();
        body["warnings"] = json!(["tables detected"]);
        assert!(parse(body).is_ok());
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let mut body = scenario_body();
        body.as_object_mut().unwrap().remove("readability_score");
        let err = parse(body).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_REPORT");
        assert!(err.to_string().contains("readability_score"), "{err}");
    }

    #[test]
    fn test_missing_section_flag_is_malformed() {
        let mut body = scenario_body();
        body["sections"].as_object_mut().unwrap().remove("education");
        assert!(matches!(parse(body), Err(AnalysisError::MalformedReport(_))));
    }

    #[test]
    fn test_mistyped_field_is_malformed() {
        let mut body = scenario_body();
        body["suggestions"] = json!("Add a summary section");
        assert!(matches!(parse(body), Err(AnalysisError::MalformedReport(_))));

        let mut body = scenario_body();
        body["sections"]["skills"] = json!("yes");
        assert!(matches!(parse(body), Err(AnalysisError::MalformedReport(_))));
    }

    #[test]
    fn test_score_out_of_range_is_malformed() {
        let mut body = scenario_body();
        body["score"] = json!(101);
        let err = parse(body).unwrap_err();
        assert!(err.to_string().contains("score must be between 0 and 100"), "{err}");

        let mut body = scenario_body();
        body["readability_score"] = json!(-1);
        assert!(matches!(parse(body), Err(AnalysisError::MalformedReport(_))));
    }

    #[test]
    fn test_negative_count_is_malformed() {
        let mut body = scenario_body();
        body["token_count"] = json!(-5);
        let err = parse(body).unwrap_err();
        assert!(err.to_string().contains("token_count must be non-negative"), "{err}");
    }

    #[test]
    fn test_fractional_score_is_malformed() {
        let mut body = scenario_body();
        body["score"] = json!(72.5);
        assert!(matches!(parse(body), Err(AnalysisError::MalformedReport(_))));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = Report::from_json(b"<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.code(), "MALFORMED_REPORT");
    }

    #[test]
    fn test_boundary_scores_accepted() {
        for score in [0, 100] {
            let mut body = scenario_body();
            body["score"] = json!(score);
            body["readability_score"] = json!(score);
            let report = parse(body).unwrap();
            assert_eq!(i64::from(report.score), score);
        }
    }

    #[test]
    fn test_empty_suggestions_allowed() {
        let mut body = scenario_body();
        body["suggestions"] = json!([]);
        assert!(parse(body).unwrap().suggestions.is_empty());
    }
}
