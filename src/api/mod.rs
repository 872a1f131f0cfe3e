//! HTTP adapter for the remote compliance service.
//!
//! Every remote interaction goes through the [`ComplianceApi`] trait so flows
//! can be exercised against [`MockApi`] in tests and demo mode. The real
//! implementation is [`HttpApiClient`], a blocking reqwest client bound to a
//! single configurable base URL.

pub mod client;
pub mod demo;
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::models::{
    ComplianceRule, EvaluationResult, Procedure, ProcedureFilter, ProcedurePatch, RuleDraft,
    RulePatch, StatsSnapshot,
};

pub use client::HttpApiClient;
pub use mock::MockApi;

/// Remote-call failure taxonomy. None of these are fatal to a page — callers
/// log and surface them inline, and the user retries the triggering action.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach compliance service at {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

/// Body for POST `/audit` — the procedure fields plus the X-ray reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditRequest {
    pub procedure_code: String,
    pub procedure_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray_url: Option<String>,
}

impl AuditRequest {
    /// Build the retroactive-audit request for an existing record: only the
    /// procedure identity, execution date and X-ray reference are resent.
    pub fn for_record(procedure: &Procedure) -> Self {
        Self {
            procedure_code: procedure.procedure_code.clone(),
            procedure_name: procedure.procedure_name.clone(),
            execution_date: Some(procedure.execution_date.clone()),
            xray_url: procedure.xray_url.clone(),
            ..Default::default()
        }
    }
}

/// Envelope returned by POST `/audit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub procedure_code: String,
    #[serde(default)]
    pub procedure_name: String,
    #[serde(default)]
    pub xray_url: Option<String>,
    #[serde(default)]
    pub evaluation_result: EvaluationResult,
}

/// Body returned by POST `/upload_image/`.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub file_url: String,
}

/// Everything the dashboard asks of the remote service.
pub trait ComplianceApi: Send + Sync {
    fn fetch_stats(&self) -> Result<StatsSnapshot, ApiError>;

    /// POST `/procedures/filter`; an all-empty filter serializes to `{}` and
    /// returns the full set.
    fn filter_procedures(&self, filter: &ProcedureFilter) -> Result<Vec<Procedure>, ApiError>;

    fn audit(&self, request: &AuditRequest) -> Result<AuditResponse, ApiError>;

    /// Store an X-ray; returns the file reference to cite in audit requests.
    fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError>;

    fn download_image(&self, name: &str) -> Result<Vec<u8>, ApiError>;

    /// GET `/uploaded/{name}` — the inline-preview variant of a stored file.
    fn preview_image(&self, name: &str) -> Result<Vec<u8>, ApiError>;

    fn list_rules(&self) -> Result<Vec<ComplianceRule>, ApiError>;

    fn create_rule(&self, draft: &RuleDraft) -> Result<(), ApiError>;

    fn update_rule(&self, id: &str, patch: &RulePatch) -> Result<(), ApiError>;

    fn create_procedure(&self, procedure: &Procedure) -> Result<(), ApiError>;

    fn update_procedure(&self, id: &str, patch: &ProcedurePatch) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_request_for_record_resends_identity_and_xray() {
        let p = Procedure {
            id: "p1".to_string(),
            procedure_code: "D3310".to_string(),
            procedure_name: "טיפול שורש".to_string(),
            execution_date: "2025-04-02".to_string(),
            doctor_name: "ד\"ר לוי".to_string(),
            xray_url: Some("xray-17.png".to_string()),
            ..Default::default()
        };
        let req = AuditRequest::for_record(&p);
        assert_eq!(req.procedure_code, "D3310");
        assert_eq!(req.xray_url.as_deref(), Some("xray-17.png"));
        // Patient and doctor are not resent for a retroactive audit.
        assert!(req.patient_id.is_none());
        assert!(req.doctor_name.is_none());
    }

    #[test]
    fn audit_request_omits_unset_fields() {
        let req = AuditRequest {
            procedure_code: "D0220".to_string(),
            procedure_name: "צילום נשך".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("patient_id"));
        assert!(!json.contains("xray_url"));
    }

    #[test]
    fn audit_response_tolerates_minimal_body() {
        let json = r#"{"evaluation_result": {"approval_status": "מאושר"}}"#;
        let resp: AuditResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.evaluation_result.approval_status, "מאושר");
        assert_eq!(resp.message, "");
    }
}
