//! Configurable in-memory `ComplianceApi` for tests and demo mode.
//!
//! Mirrors the service contract closely enough for flow tests: audit verdicts
//! are canned, partial updates mutate the held records, and every call is
//! counted so tests can assert that a guard prevented network traffic.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use uuid::Uuid;

use crate::models::enums::LABEL_APPROVED;
use crate::models::{
    AiAnalysis, ComplianceRule, EvaluationResult, Procedure, ProcedureFilter, ProcedurePatch,
    RuleDraft, RulePatch, StatsSnapshot,
};

use super::{ApiError, AuditRequest, AuditResponse, ComplianceApi};

/// Per-operation call counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallCounts {
    pub stats: usize,
    pub filter: usize,
    pub audit: usize,
    pub upload: usize,
    pub download: usize,
    pub list_rules: usize,
    pub create_rule: usize,
    pub update_rule: usize,
    pub create_procedure: usize,
    pub update_procedure: usize,
}

#[derive(Default)]
struct MockState {
    stats_sequence: Vec<StatsSnapshot>,
    procedures: Vec<Procedure>,
    rules: Vec<ComplianceRule>,
    audit_label: String,
    fail_audit_codes: HashSet<String>,
    fail_upload: bool,
    fail_stats_times: usize,
    images: HashMap<String, Vec<u8>>,
    calls: CallCounts,
}

/// Mock compliance service — returns configurable responses.
pub struct MockApi {
    state: Mutex<MockState>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                audit_label: LABEL_APPROVED.to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn with_procedures(self, procedures: Vec<Procedure>) -> Self {
        self.state.lock().unwrap().procedures = procedures;
        self
    }

    pub fn with_rules(self, rules: Vec<ComplianceRule>) -> Self {
        self.state.lock().unwrap().rules = rules;
        self
    }

    pub fn with_stats(self, snapshot: StatsSnapshot) -> Self {
        self.state.lock().unwrap().stats_sequence = vec![snapshot];
        self
    }

    /// Successive `fetch_stats` calls walk this sequence; the last entry
    /// repeats once the sequence is exhausted.
    pub fn with_stats_sequence(self, snapshots: Vec<StatsSnapshot>) -> Self {
        self.state.lock().unwrap().stats_sequence = snapshots;
        self
    }

    /// Verdict label the mock attaches to every audit response.
    pub fn with_audit_label(self, label: &str) -> Self {
        self.state.lock().unwrap().audit_label = label.to_string();
        self
    }

    /// Make audits of this procedure code fail with HTTP 500.
    pub fn failing_audit_for(self, procedure_code: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_audit_codes
            .insert(procedure_code.to_string());
        self
    }

    pub fn failing_upload(self) -> Self {
        self.state.lock().unwrap().fail_upload = true;
        self
    }

    /// Make the first `n` stats fetches fail with HTTP 503.
    pub fn failing_stats_times(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_stats_times = n;
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn procedures(&self) -> Vec<Procedure> {
        self.state.lock().unwrap().procedures.clone()
    }

    pub fn rules(&self) -> Vec<ComplianceRule> {
        self.state.lock().unwrap().rules.clone()
    }
}

impl ComplianceApi for MockApi {
    fn fetch_stats(&self) -> Result<StatsSnapshot, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.stats += 1;
        if state.fail_stats_times > 0 {
            state.fail_stats_times -= 1;
            return Err(ApiError::Http {
                status: 503,
                body: "stats unavailable".to_string(),
            });
        }
        if state.stats_sequence.is_empty() {
            return Ok(StatsSnapshot::default());
        }
        if state.stats_sequence.len() > 1 {
            Ok(state.stats_sequence.remove(0))
        } else {
            Ok(state.stats_sequence[0].clone())
        }
    }

    fn filter_procedures(&self, _filter: &ProcedureFilter) -> Result<Vec<Procedure>, ApiError> {
        // Server-side filtering is opaque; the mock hands back the full set
        // and lets the client-side pipeline narrow it.
        let mut state = self.state.lock().unwrap();
        state.calls.filter += 1;
        Ok(state.procedures.clone())
    }

    fn audit(&self, request: &AuditRequest) -> Result<AuditResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.audit += 1;
        if state.fail_audit_codes.contains(&request.procedure_code) {
            return Err(ApiError::Http {
                status: 500,
                body: "analysis failed".to_string(),
            });
        }
        Ok(AuditResponse {
            message: "Audit received".to_string(),
            procedure_code: request.procedure_code.clone(),
            procedure_name: request.procedure_name.clone(),
            xray_url: request.xray_url.clone(),
            evaluation_result: EvaluationResult {
                approval_status: state.audit_label.clone(),
                ai_analysis: AiAnalysis {
                    risk_level: "low".to_string(),
                    confidence: 0.9,
                    findings: "ללא ממצאים חריגים".to_string(),
                    recommendations: String::new(),
                    medical_justification: true,
                    contraindications: false,
                },
            },
        })
    }

    fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upload += 1;
        if state.fail_upload {
            return Err(ApiError::Http {
                status: 400,
                body: "upload rejected".to_string(),
            });
        }
        state.images.insert(file_name.to_string(), bytes);
        Ok(file_name.to_string())
    }

    fn download_image(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.download += 1;
        state.images.get(name).cloned().ok_or(ApiError::Http {
            status: 404,
            body: "File not found".to_string(),
        })
    }

    fn preview_image(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.download_image(name)
    }

    fn list_rules(&self) -> Result<Vec<ComplianceRule>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_rules += 1;
        Ok(state.rules.clone())
    }

    fn create_rule(&self, draft: &RuleDraft) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_rule += 1;
        let rule = ComplianceRule {
            id: Uuid::new_v4().to_string(),
            rule_name: draft.rule_name.clone(),
            condition: draft.condition.clone(),
            action: draft.action,
            severity: draft.severity,
            description: draft.description.clone(),
            procedure_codes: draft.procedure_codes.clone(),
            is_active: draft.is_active,
        };
        state.rules.push(rule);
        Ok(())
    }

    fn update_rule(&self, id: &str, patch: &RulePatch) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.update_rule += 1;
        let rule = state
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::Http {
                status: 404,
                body: "rule not found".to_string(),
            })?;
        if let Some(ref v) = patch.rule_name {
            rule.rule_name = v.clone();
        }
        if let Some(ref v) = patch.condition {
            rule.condition = v.clone();
        }
        if let Some(v) = patch.action {
            rule.action = v;
        }
        if let Some(v) = patch.severity {
            rule.severity = v;
        }
        if let Some(ref v) = patch.description {
            rule.description = v.clone();
        }
        if let Some(ref v) = patch.procedure_codes {
            rule.procedure_codes = v.clone();
        }
        if let Some(v) = patch.is_active {
            rule.is_active = v;
        }
        Ok(())
    }

    fn create_procedure(&self, procedure: &Procedure) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_procedure += 1;
        let mut record = procedure.clone();
        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        state.procedures.push(record);
        Ok(())
    }

    fn update_procedure(&self, id: &str, patch: &ProcedurePatch) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.update_procedure += 1;
        let record = state
            .procedures
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::Http {
                status: 404,
                body: "procedure not found".to_string(),
            })?;
        if let Some(ref notes) = patch.notes {
            record.notes = notes.clone();
        }
        if let Some(ref result) = patch.evaluation_result {
            record.evaluation_result = Some(result.clone());
        }
        Ok(())
    }
}
