//! Procedure intake flow.
//!
//! An explicit state machine: `Editing` → `Uploading` → `Editing` (reference
//! stored) → `Analyzing` → `Locked`. Any step may pick up an error annotation
//! without losing the entered data. Submission is guarded on a patient id and
//! a successfully uploaded X-ray; once a verdict arrives the form freezes
//! until an explicit reset.

use crate::api::{ApiError, AuditRequest, ComplianceApi};
use crate::models::{ApprovalStatus, EvaluationResult};

/// Inline messages surfaced next to the triggering control.
pub const MSG_MISSING_FIELDS: &str = "אנא מלא מזהה מטופל והעלה צילום רנטגן";
pub const MSG_UPLOAD_FAILED: &str = "שגיאה בהעלאת הקובץ. אנא נסה שוב.";
pub const MSG_ANALYSIS_FAILED: &str = "שגיאה בניתוח הפרוצדורה. אנא נסה שוב.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakePhase {
    #[default]
    Editing,
    Uploading,
    Analyzing,
    Locked,
}

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeField {
    PatientId,
    ProcedureCode,
    ProcedureName,
    DoctorName,
    ExecutionDate,
    Notes,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeForm {
    pub patient_id: String,
    pub procedure_code: String,
    pub procedure_name: String,
    pub doctor_name: String,
    pub execution_date: String,
    pub notes: String,
}

/// The verdict shown once analysis completes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub status: ApprovalStatus,
    pub evaluation: EvaluationResult,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("patient id and an uploaded X-ray are required")]
    MissingRequiredFields,
    #[error("form is not editable in the current phase")]
    NotEditable,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// State for one intake session.
#[derive(Debug, Default)]
pub struct IntakeFlow {
    form: IntakeForm,
    phase: IntakePhase,
    xray_file: Option<String>,
    xray_url: Option<String>,
    result: Option<AnalysisOutcome>,
    error: Option<String>,
}

impl IntakeFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> IntakePhase {
        self.phase
    }

    pub fn form(&self) -> &IntakeForm {
        &self.form
    }

    /// Name of the selected X-ray file, once one was uploaded.
    pub fn xray_file(&self) -> Option<&str> {
        self.xray_file.as_deref()
    }

    /// Stored file reference returned by the upload endpoint.
    pub fn xray_url(&self) -> Option<&str> {
        self.xray_url.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisOutcome> {
        self.result.as_ref()
    }

    /// Current error annotation, if any. Never clears entered data.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Edit a form field. Allowed only while editing; clears the annotation.
    pub fn set_field(&mut self, field: IntakeField, value: &str) -> Result<(), IntakeError> {
        if self.phase() != IntakePhase::Editing {
            return Err(IntakeError::NotEditable);
        }
        let slot = match field {
            IntakeField::PatientId => &mut self.form.patient_id,
            IntakeField::ProcedureCode => &mut self.form.procedure_code,
            IntakeField::ProcedureName => &mut self.form.procedure_name,
            IntakeField::DoctorName => &mut self.form.doctor_name,
            IntakeField::ExecutionDate => &mut self.form.execution_date,
            IntakeField::Notes => &mut self.form.notes,
        };
        *slot = value.to_string();
        self.error = None;
        Ok(())
    }

    /// Upload an X-ray and store the returned reference. On failure the form
    /// stays editable with an inline message; the user retries.
    pub fn upload(
        &mut self,
        api: &dyn ComplianceApi,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), IntakeError> {
        if self.phase() != IntakePhase::Editing {
            return Err(IntakeError::NotEditable);
        }
        self.phase = IntakePhase::Uploading;

        match api.upload_image(file_name, bytes) {
            Ok(file_url) => {
                self.xray_file = Some(file_name.to_string());
                self.xray_url = Some(file_url);
                self.error = None;
                self.phase = IntakePhase::Editing;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, file_name, "X-ray upload failed");
                self.error = Some(MSG_UPLOAD_FAILED.to_string());
                self.phase = IntakePhase::Editing;
                Err(e.into())
            }
        }
    }

    /// Submit guard: a patient id and an uploaded X-ray reference.
    pub fn can_submit(&self) -> bool {
        self.phase() == IntakePhase::Editing
            && !self.form.patient_id.trim().is_empty()
            && self.xray_url.is_some()
    }

    /// Submit for analysis. Client-side validation runs first — a failing
    /// guard makes no network call. On success the form locks and one
    /// fire-and-forget stats refresh is triggered.
    pub fn submit(&mut self, api: &dyn ComplianceApi) -> Result<&AnalysisOutcome, IntakeError> {
        if self.phase() == IntakePhase::Locked || self.phase() == IntakePhase::Analyzing {
            return Err(IntakeError::NotEditable);
        }
        if !self.can_submit() {
            self.error = Some(MSG_MISSING_FIELDS.to_string());
            return Err(IntakeError::MissingRequiredFields);
        }

        self.phase = IntakePhase::Analyzing;
        self.error = None;

        let request = AuditRequest {
            procedure_code: self.form.procedure_code.clone(),
            procedure_name: self.form.procedure_name.clone(),
            execution_date: Some(self.form.execution_date.clone()),
            patient_id: Some(self.form.patient_id.clone()),
            doctor_name: Some(self.form.doctor_name.clone()),
            notes: Some(self.form.notes.clone()),
            xray_url: self.xray_url.clone(),
        };

        match api.audit(&request) {
            Ok(response) => {
                self.phase = IntakePhase::Locked;

                // Fire-and-forget stats refresh; failure is logged only.
                if let Err(e) = api.fetch_stats() {
                    tracing::warn!(error = %e, "Stats refresh after analysis failed");
                }

                let evaluation = response.evaluation_result;
                Ok(&*self.result.insert(AnalysisOutcome {
                    status: evaluation.status(),
                    evaluation,
                }))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Procedure analysis failed");
                self.error = Some(MSG_ANALYSIS_FAILED.to_string());
                self.phase = IntakePhase::Editing;
                Err(e.into())
            }
        }
    }

    /// Clear everything back to a pristine editing state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::models::enums::LABEL_REQUIRES_REVIEW;

    fn filled_flow(api: &MockApi) -> IntakeFlow {
        let mut flow = IntakeFlow::new();
        flow.set_field(IntakeField::PatientId, "204857613").unwrap();
        flow.set_field(IntakeField::ProcedureCode, "D3310").unwrap();
        flow.set_field(IntakeField::ProcedureName, "טיפול שורש").unwrap();
        flow.upload(api, "xray.png", vec![0xFF, 0xD8]).unwrap();
        flow
    }

    #[test]
    fn empty_patient_id_blocks_submit_without_network_call() {
        let api = MockApi::new();
        let mut flow = IntakeFlow::new();
        flow.upload(&api, "xray.png", vec![1]).unwrap();
        flow.set_field(IntakeField::PatientId, "").unwrap();

        assert!(!flow.can_submit());
        let err = flow.submit(&api).unwrap_err();
        assert!(matches!(err, IntakeError::MissingRequiredFields));
        assert_eq!(api.calls().audit, 0, "guard must prevent the audit call");
        assert_eq!(flow.error(), Some(MSG_MISSING_FIELDS));
        assert_eq!(flow.phase(), IntakePhase::Editing);
    }

    #[test]
    fn missing_xray_blocks_submit() {
        let api = MockApi::new();
        let mut flow = IntakeFlow::new();
        flow.set_field(IntakeField::PatientId, "204857613").unwrap();
        assert!(!flow.can_submit());
        assert!(flow.submit(&api).is_err());
        assert_eq!(api.calls().audit, 0);
    }

    #[test]
    fn successful_analysis_locks_and_refreshes_stats() {
        let api = MockApi::new().with_audit_label(LABEL_REQUIRES_REVIEW);
        let mut flow = filled_flow(&api);

        let outcome = flow.submit(&api).unwrap();
        assert_eq!(outcome.status, ApprovalStatus::RequiresReview);
        assert_eq!(flow.phase(), IntakePhase::Locked);
        assert_eq!(api.calls().audit, 1);
        assert_eq!(api.calls().stats, 1, "one fire-and-forget stats refresh");
    }

    #[test]
    fn unexpected_server_label_maps_to_unknown() {
        let api = MockApi::new().with_audit_label("בהמתנה");
        let mut flow = filled_flow(&api);
        let outcome = flow.submit(&api).unwrap();
        assert_eq!(outcome.status, ApprovalStatus::Unknown);
    }

    #[test]
    fn locked_form_rejects_edits_and_resubmits() {
        let api = MockApi::new();
        let mut flow = filled_flow(&api);
        flow.submit(&api).unwrap();

        assert!(matches!(
            flow.set_field(IntakeField::Notes, "x"),
            Err(IntakeError::NotEditable)
        ));
        assert!(matches!(flow.submit(&api), Err(IntakeError::NotEditable)));
        assert!(matches!(
            flow.upload(&api, "other.png", vec![1]),
            Err(IntakeError::NotEditable)
        ));
        assert_eq!(api.calls().audit, 1);
    }

    #[test]
    fn analysis_failure_keeps_data_and_annotates() {
        let api = MockApi::new().failing_audit_for("D3310");
        let mut flow = filled_flow(&api);

        assert!(flow.submit(&api).is_err());
        assert_eq!(flow.phase(), IntakePhase::Editing);
        assert_eq!(flow.error(), Some(MSG_ANALYSIS_FAILED));
        assert_eq!(flow.form().patient_id, "204857613", "data survives the error");
        assert!(flow.result().is_none());
    }

    #[test]
    fn stats_refresh_failure_does_not_fail_the_submit() {
        let api = MockApi::new().failing_stats_times(1);
        let mut flow = filled_flow(&api);
        assert!(flow.submit(&api).is_ok());
        assert_eq!(flow.phase(), IntakePhase::Locked);
    }

    #[test]
    fn upload_failure_annotates_and_stays_editable() {
        let api = MockApi::new().failing_upload();
        let mut flow = IntakeFlow::new();
        flow.set_field(IntakeField::PatientId, "204857613").unwrap();

        assert!(flow.upload(&api, "xray.png", vec![1]).is_err());
        assert_eq!(flow.phase(), IntakePhase::Editing);
        assert_eq!(flow.error(), Some(MSG_UPLOAD_FAILED));
        assert!(flow.xray_url().is_none());
        assert_eq!(flow.form().patient_id, "204857613");
    }

    #[test]
    fn reset_returns_to_pristine_editing() {
        let api = MockApi::new();
        let mut flow = filled_flow(&api);
        flow.submit(&api).unwrap();

        flow.reset();
        assert_eq!(flow.phase(), IntakePhase::Editing);
        assert_eq!(flow.form(), &IntakeForm::default());
        assert!(flow.xray_url().is_none());
        assert!(flow.result().is_none());
        assert!(flow.error().is_none());
    }
}
