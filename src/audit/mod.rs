//! Retroactive audit review: the page-level flow over the full procedure set.
//!
//! Owns a transient copy of the server's procedure list, applies the
//! client-side filter pipeline, and hands qualifying records to the batch
//! worker. After a batch the set is reloaded so server-side note updates are
//! reflected.

pub mod batch;
pub mod filter;

use std::sync::Arc;

use crate::api::{ApiError, ComplianceApi};
use crate::models::{ApprovalStatus, Procedure, ProcedureFilter};

pub use batch::{
    spawn_batch, AuditBatchError, AuditBatchHandle, AuditEvent, AuditProgress, AuditSummary,
    MSG_NO_XRAY_CANDIDATES,
};

/// Page-level counts over the full (unfiltered) set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditCards {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

/// State behind the audit review screen.
#[derive(Debug, Default)]
pub struct AuditReview {
    procedures: Vec<Procedure>,
    filter: ProcedureFilter,
}

impl AuditReview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full procedure set (empty filter body) and keep it sorted by
    /// creation time, newest first.
    pub fn load(&mut self, api: &dyn ComplianceApi) -> Result<(), ApiError> {
        let mut procedures = api.filter_procedures(&ProcedureFilter::default())?;
        procedures.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.procedures = procedures;
        Ok(())
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn filter(&self) -> &ProcedureFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ProcedureFilter) {
        self.filter = filter;
    }

    /// Reset every filter dimension.
    pub fn clear_filter(&mut self) {
        self.filter = ProcedureFilter::default();
    }

    /// The currently visible records, re-derived from the source set and the
    /// filter on every call.
    pub fn filtered(&self) -> Vec<Procedure> {
        filter::apply(&self.procedures, &self.filter)
    }

    /// How many filtered records a batch would actually audit.
    pub fn auditable_count(&self) -> usize {
        batch::candidates(&self.filtered()).len()
    }

    /// Stat cards over the full set, independent of the filter.
    pub fn cards(&self) -> AuditCards {
        let mut cards = AuditCards {
            total: self.procedures.len(),
            ..Default::default()
        };
        for p in &self.procedures {
            match p.status() {
                ApprovalStatus::Approved => cards.approved += 1,
                ApprovalStatus::RequiresReview => cards.pending += 1,
                ApprovalStatus::Rejected => cards.rejected += 1,
                ApprovalStatus::Unknown => {}
            }
        }
        cards
    }

    /// Kick off a batch over the filtered records.
    pub fn start_batch(
        &self,
        api: Arc<dyn ComplianceApi>,
    ) -> Result<AuditBatchHandle, AuditBatchError> {
        spawn_batch(api, self.filtered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::models::enums::{LABEL_APPROVED, LABEL_REQUIRES_REVIEW};
    use crate::models::EvaluationResult;

    fn evaluated(id: &str, created_at: &str, label: &str) -> Procedure {
        Procedure {
            id: id.to_string(),
            created_at: created_at.to_string(),
            xray_url: Some(format!("xray-{id}.png")),
            evaluation_result: Some(EvaluationResult {
                approval_status: label.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn load_sorts_newest_first() {
        let api = MockApi::new().with_procedures(vec![
            evaluated("old", "2025-01-01T10:00:00", LABEL_APPROVED),
            evaluated("new", "2025-06-01T10:00:00", LABEL_APPROVED),
        ]);
        let mut review = AuditReview::new();
        review.load(&api).unwrap();
        assert_eq!(review.procedures()[0].id, "new");
    }

    #[test]
    fn cards_count_by_status_over_full_set() {
        let api = MockApi::new().with_procedures(vec![
            evaluated("a", "2025-01-01T10:00:00", LABEL_APPROVED),
            evaluated("b", "2025-01-02T10:00:00", LABEL_REQUIRES_REVIEW),
            Procedure::default(),
        ]);
        let mut review = AuditReview::new();
        review.load(&api).unwrap();

        let cards = review.cards();
        assert_eq!(cards.total, 3);
        assert_eq!(cards.approved, 1);
        assert_eq!(cards.pending, 1);
        assert_eq!(cards.rejected, 0);
    }

    #[test]
    fn auditable_count_respects_filter_and_xray() {
        let api = MockApi::new().with_procedures(vec![
            evaluated("a", "2025-01-01T10:00:00", LABEL_APPROVED),
            Procedure {
                xray_url: None,
                ..evaluated("b", "2025-01-02T10:00:00", LABEL_APPROVED)
            },
        ]);
        let mut review = AuditReview::new();
        review.load(&api).unwrap();
        assert_eq!(review.auditable_count(), 1);

        review.set_filter(ProcedureFilter {
            doctor_name: Some("אין כזה".to_string()),
            ..Default::default()
        });
        assert_eq!(review.auditable_count(), 0);
    }

    #[test]
    fn reload_after_batch_reflects_server_state() {
        let records = vec![evaluated("a", "2025-01-01T10:00:00", LABEL_APPROVED)];
        let api = Arc::new(MockApi::new().with_procedures(records));
        let mut review = AuditReview::new();
        review.load(api.as_ref()).unwrap();

        let handle = review.start_batch(api.clone()).unwrap();
        handle.join();

        review.load(api.as_ref()).unwrap();
        assert!(review.procedures()[0].notes.contains("ביקורת רטרואקטיבית"));
    }
}
