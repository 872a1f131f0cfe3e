//! Procedure records as returned by `/procedures/filter`.
//!
//! The server is the source of truth; the client only ever holds a transient
//! in-memory copy per page load. Dates stay wire-shaped strings: the filter
//! contract is an inclusive *string* comparison on the execution date, and the
//! grid tolerates whatever the server stored.

use serde::{Deserialize, Serialize};

use super::enums::ApprovalStatus;

/// Nested AI analysis attached to an evaluated procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub medical_justification: bool,
    #[serde(default)]
    pub contraindications: bool,
}

/// The server's compliance verdict for one procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Raw server label, one of three fixed Hebrew strings (or something new).
    #[serde(default)]
    pub approval_status: String,
    #[serde(default)]
    pub ai_analysis: AiAnalysis,
}

impl EvaluationResult {
    pub fn status(&self) -> ApprovalStatus {
        ApprovalStatus::from_label(&self.approval_status)
    }
}

/// A dental procedure record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub procedure_code: String,
    #[serde(default)]
    pub procedure_name: String,
    #[serde(default)]
    pub doctor_name: String,
    /// Date the procedure was performed, as stored server-side (ISO date).
    #[serde(default)]
    pub execution_date: String,
    #[serde(default)]
    pub notes: String,
    /// Reference to the uploaded X-ray, if one was attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xray_url: Option<String>,
    /// Record creation timestamp (ISO datetime).
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_result: Option<EvaluationResult>,
}

impl Procedure {
    /// Verdict derived from the nested evaluation; `Unknown` when the record
    /// has not been evaluated yet.
    pub fn status(&self) -> ApprovalStatus {
        self.evaluation_result
            .as_ref()
            .map(EvaluationResult::status)
            .unwrap_or(ApprovalStatus::Unknown)
    }

    /// Date used for reporting: execution date, falling back to creation time.
    pub fn report_date(&self) -> &str {
        if self.execution_date.is_empty() {
            &self.created_at
        } else {
            &self.execution_date
        }
    }
}

/// Partial update for a procedure record (PUT `/medical-procedures/{id}`).
/// Only populated fields reach the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcedurePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_result: Option<EvaluationResult>,
}
