//! Retroactive batch audit.
//!
//! Processes the qualifying records **sequentially** — one analysis call at a
//! time — so progress reporting stays accurate and the server never sees
//! unbounded concurrent load. A per-item failure is logged and the batch moves
//! on; there is no abort and no rollback. The worker variant carries a
//! cancellation flag checked between items and streams progress events over a
//! channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use crate::api::{AuditRequest, ComplianceApi};
use crate::models::{Procedure, ProcedurePatch};

/// Shown when the filtered set holds nothing with an X-ray to audit.
pub const MSG_NO_XRAY_CANDIDATES: &str = "לא נמצאו פרוצדורות עם צילומי רנטגן לביקורת";

/// Prefix for the note appended to an audited record.
const RETRO_AUDIT_NOTE: &str = "ביקורת רטרואקטיבית";

#[derive(Debug, thiserror::Error)]
pub enum AuditBatchError {
    #[error("no filtered procedures carry an X-ray reference")]
    NoXrayCandidates,
}

/// Counters for an in-flight batch. `current` advances once per processed
/// item regardless of that item's success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditProgress {
    pub current: usize,
    pub total: usize,
}

impl AuditProgress {
    pub fn percent(&self) -> u16 {
        if self.total == 0 {
            0
        } else {
            (self.current * 100 / self.total) as u16
        }
    }
}

/// Final tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditSummary {
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    Started { total: usize },
    Progress(AuditProgress),
    ItemFailed { procedure_id: String, error: String },
    Completed(AuditSummary),
    Cancelled(AuditSummary),
}

/// Select the records a batch would touch: filtered records that carry an
/// X-ray reference.
pub fn candidates(procedures: &[Procedure]) -> Vec<Procedure> {
    procedures
        .iter()
        .filter(|p| p.xray_url.as_deref().is_some_and(|u| !u.is_empty()))
        .cloned()
        .collect()
}

/// Run the batch synchronously. `progress_fn` receives every event; `cancel`
/// is checked between items (an in-flight item always completes).
pub fn run_batch(
    api: &dyn ComplianceApi,
    procedures: &[Procedure],
    progress_fn: Option<&dyn Fn(AuditEvent)>,
    cancel: Option<&AtomicBool>,
) -> Result<AuditSummary, AuditBatchError> {
    let targets = candidates(procedures);
    if targets.is_empty() {
        return Err(AuditBatchError::NoXrayCandidates);
    }

    let emit = |event: AuditEvent| {
        if let Some(f) = progress_fn {
            f(event);
        }
    };

    let total = targets.len();
    let mut summary = AuditSummary {
        total,
        ..Default::default()
    };

    emit(AuditEvent::Started { total });

    for procedure in &targets {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            tracing::info!(
                processed = summary.processed,
                total,
                "Batch audit cancelled"
            );
            emit(AuditEvent::Cancelled(summary.clone()));
            return Ok(summary);
        }

        match audit_one(api, procedure) {
            Ok(()) => summary.succeeded += 1,
            Err(error) => {
                tracing::warn!(procedure_id = procedure.id, error, "Audit item failed");
                summary.failed += 1;
                summary.errors.push(format!("{}: {error}", procedure.id));
                emit(AuditEvent::ItemFailed {
                    procedure_id: procedure.id.clone(),
                    error,
                });
            }
        }

        // Counter advances after each completed item, success or not.
        summary.processed += 1;
        emit(AuditEvent::Progress(AuditProgress {
            current: summary.processed,
            total,
        }));
    }

    tracing::info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch audit completed"
    );
    emit(AuditEvent::Completed(summary.clone()));
    Ok(summary)
}

/// One item: request the analysis, then persist the appended note.
fn audit_one(api: &dyn ComplianceApi, procedure: &Procedure) -> Result<(), String> {
    let request = AuditRequest::for_record(procedure);
    let response = api.audit(&request).map_err(|e| e.to_string())?;

    let analysis =
        serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.message.clone());
    let notes = format!(
        "{}\n\n{RETRO_AUDIT_NOTE}: {analysis}",
        procedure.notes
    );

    api.update_procedure(
        &procedure.id,
        &ProcedurePatch {
            notes: Some(notes),
            ..Default::default()
        },
    )
    .map_err(|e| e.to_string())
}

/// Handle for a batch running on a worker thread. Events arrive over the
/// channel; `cancel()` stops the run between items.
pub struct AuditBatchHandle {
    cancel: Arc<AtomicBool>,
    events: mpsc::Receiver<AuditEvent>,
    handle: Option<std::thread::JoinHandle<AuditSummary>>,
}

impl AuditBatchHandle {
    /// Request cancellation; the item in flight completes first.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Drain any events delivered since the last poll.
    pub fn poll_events(&self) -> Vec<AuditEvent> {
        self.events.try_iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Wait for the worker and return the final tally.
    pub fn join(mut self) -> AuditSummary {
        match self.handle.take() {
            Some(h) => h.join().unwrap_or_default(),
            None => AuditSummary::default(),
        }
    }
}

/// Start the batch on a worker thread. Fails fast — before any thread or
/// network activity — when nothing qualifies.
pub fn spawn_batch(
    api: Arc<dyn ComplianceApi>,
    procedures: Vec<Procedure>,
) -> Result<AuditBatchHandle, AuditBatchError> {
    if candidates(&procedures).is_empty() {
        return Err(AuditBatchError::NoXrayCandidates);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    let (tx, rx) = mpsc::channel();

    let handle = std::thread::spawn(move || {
        let progress = move |event: AuditEvent| {
            let _ = tx.send(event);
        };
        // Candidates were verified above; the error arm is unreachable here.
        run_batch(api.as_ref(), &procedures, Some(&progress), Some(&flag))
            .unwrap_or_default()
    });

    Ok(AuditBatchHandle {
        cancel,
        events: rx,
        handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use std::sync::Mutex;

    fn with_xray(id: &str, code: &str) -> Procedure {
        Procedure {
            id: id.to_string(),
            procedure_code: code.to_string(),
            procedure_name: "בדיקה".to_string(),
            execution_date: "2025-05-01".to_string(),
            xray_url: Some(format!("xray-{id}.png")),
            ..Default::default()
        }
    }

    fn without_xray(id: &str) -> Procedure {
        Procedure {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn no_candidates_means_no_network_calls() {
        let api = MockApi::new().with_procedures(vec![without_xray("p1")]);
        let set = vec![without_xray("p1")];

        let err = run_batch(&api, &set, None, None).unwrap_err();
        assert!(matches!(err, AuditBatchError::NoXrayCandidates));
        assert_eq!(api.calls().audit, 0);
        assert_eq!(api.calls().update_procedure, 0);
    }

    #[test]
    fn progress_increments_once_per_item_and_ends_at_total() {
        let set = vec![
            with_xray("p1", "D0220"),
            without_xray("p2"),
            with_xray("p3", "D3310"),
            with_xray("p4", "D7140"),
        ];
        let api = MockApi::new()
            .with_procedures(set.clone())
            .failing_audit_for("D3310");

        let seen: Mutex<Vec<AuditProgress>> = Mutex::new(Vec::new());
        let progress = |event: AuditEvent| {
            if let AuditEvent::Progress(p) = event {
                seen.lock().unwrap().push(p);
            }
        };

        let summary = run_batch(&api, &set, Some(&progress), None).unwrap();
        assert_eq!(summary.total, 3, "only records with an X-ray qualify");
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let seen = seen.lock().unwrap();
        let currents: Vec<usize> = seen.iter().map(|p| p.current).collect();
        assert_eq!(currents, vec![1, 2, 3], "one increment per item, failures included");
        assert!(seen.iter().all(|p| p.current <= p.total));
    }

    #[test]
    fn item_failure_does_not_block_the_remainder() {
        let set = vec![with_xray("p1", "D3310"), with_xray("p2", "D0220")];
        let api = MockApi::new()
            .with_procedures(set.clone())
            .failing_audit_for("D3310");

        let summary = run_batch(&api, &set, None, None).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.errors.len(), 1);
        // The failing item never reaches the persistence step.
        assert_eq!(api.calls().update_procedure, 1);
    }

    #[test]
    fn successful_item_appends_retro_audit_note() {
        let set = vec![Procedure {
            notes: "הערה קיימת".to_string(),
            ..with_xray("p1", "D0220")
        }];
        let api = MockApi::new().with_procedures(set.clone());

        run_batch(&api, &set, None, None).unwrap();

        let updated = &api.procedures()[0];
        assert!(updated.notes.starts_with("הערה קיימת\n\n"));
        assert!(updated.notes.contains(RETRO_AUDIT_NOTE));
        assert!(updated.notes.contains("approval_status"));
    }

    #[test]
    fn cancellation_stops_between_items() {
        let set = vec![with_xray("p1", "D0220"), with_xray("p2", "D3310")];
        let api = MockApi::new().with_procedures(set.clone());

        let cancel = AtomicBool::new(false);
        let progress = |event: AuditEvent| {
            // Cancel as soon as the first item completes.
            if matches!(event, AuditEvent::Progress(p) if p.current == 1) {
                cancel.store(true, Ordering::Relaxed);
            }
        };

        let summary = run_batch(&api, &set, Some(&progress), Some(&cancel)).unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(api.calls().audit, 1, "second item never starts");
    }

    #[test]
    fn spawned_batch_streams_events_and_joins() {
        let set = vec![with_xray("p1", "D0220"), with_xray("p2", "D7140")];
        let api = Arc::new(MockApi::new().with_procedures(set.clone()));

        let handle = spawn_batch(api.clone() as Arc<dyn ComplianceApi>, set).unwrap();
        let summary = handle.join();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.succeeded, 2);
    }

    #[test]
    fn spawn_fails_fast_with_nothing_to_audit() {
        let api = Arc::new(MockApi::new());
        let result = spawn_batch(api.clone() as Arc<dyn ComplianceApi>, vec![without_xray("p1")]);
        assert!(result.is_err());
        assert_eq!(api.calls().audit, 0);
    }

    #[test]
    fn progress_percent_rounds_down() {
        let p = AuditProgress { current: 1, total: 3 };
        assert_eq!(p.percent(), 33);
        let done = AuditProgress { current: 3, total: 3 };
        assert_eq!(done.percent(), 100);
        assert_eq!(AuditProgress::default().percent(), 0);
    }
}
