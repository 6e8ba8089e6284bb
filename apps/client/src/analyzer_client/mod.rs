//! Analyzer client: the single point of entry for calls to the remote resume analyzer.
//!
//! ARCHITECTURAL RULE: No other module may talk to the analyzer endpoint directly.
//! The session layer only sees the `Analyzer` trait, so tests can swap in a scripted
//! backend without a network.
//!
//! One request per call. No retries: a failed submission needs an explicit resubmit.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::{AnalysisError, GENERIC_REJECTION};
use crate::models::{Report, SelectedFile};

pub const ANALYZE_PATH: &str = "/analyze_resume";
const FILE_FIELD: &str = "file";

/// Remote resume analysis. Implemented over HTTP by `HttpAnalyzer`.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, file: &SelectedFile) -> Result<Report, AnalysisError>;
}

/// Error body the analyzer sends with non-success statuses. `detail` is usually a
/// string but validation failures send a list, so it is kept loose here.
#[derive(Debug, Deserialize)]
struct RejectionBody {
    detail: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct HttpAnalyzer {
    client: Client,
    url: String,
}

impl HttpAnalyzer {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: analyze_url(endpoint),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AnalysisError> {
        Self::new(&config.endpoint, config.request_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, file: &SelectedFile) -> Result<Report, AnalysisError> {
        // `Bytes` is shared, so the upload body is not copied.
        let part = Part::stream(file.content.clone()).file_name(file.name.clone());
        let form = Form::new().part(FILE_FIELD, part);

        debug!("POST {} ({} bytes)", self.url, file.size());

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Analyzer request failed before a response: {e}");
                AnalysisError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = rejection_detail(&body);
            warn!("Analyzer returned {}: {}", status, detail);
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let report = Report::from_json(&body)?;
        debug!(
            "Analysis succeeded: score={}, suggestions={}",
            report.score,
            report.suggestions.len()
        );
        Ok(report)
    }
}

fn analyze_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), ANALYZE_PATH)
}

/// Pulls the `detail` string out of an error body, verbatim. Missing, blank,
/// non-string, or non-JSON details fall back to the generic message.
fn rejection_detail(body: &[u8]) -> String {
    serde_json::from_slice::<RejectionBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(String::from))
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| GENERIC_REJECTION.to_string())
}
