//! Pure, synchronous filtering over the held procedure set.
//!
//! A record passes only if it satisfies every non-empty dimension (AND
//! semantics): inclusive string comparison on the execution-date bounds,
//! case-insensitive substring on doctor name and procedure code, exact label
//! match on the nested evaluation status. Re-derived on every change — the
//! sets are small enough that no incremental diffing is warranted.

use crate::models::{Procedure, ProcedureFilter};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Does a single record satisfy every non-empty filter dimension?
pub fn matches(procedure: &Procedure, filter: &ProcedureFilter) -> bool {
    if let Some(ref from) = filter.date_from {
        if procedure.execution_date.as_str() < from.as_str() {
            return false;
        }
    }
    if let Some(ref to) = filter.date_to {
        if procedure.execution_date.as_str() > to.as_str() {
            return false;
        }
    }
    if let Some(ref name) = filter.doctor_name {
        if !contains_ci(&procedure.doctor_name, name) {
            return false;
        }
    }
    if let Some(ref code) = filter.procedure_code {
        if !contains_ci(&procedure.procedure_code, code) {
            return false;
        }
    }
    filter.status.matches(
        procedure
            .evaluation_result
            .as_ref()
            .map(|e| e.approval_status.as_str()),
    )
}

/// Apply the filter to a procedure set.
pub fn apply(procedures: &[Procedure], filter: &ProcedureFilter) -> Vec<Procedure> {
    procedures
        .iter()
        .filter(|&p| matches(p, filter))
        .cloned()
        .collect()
}
