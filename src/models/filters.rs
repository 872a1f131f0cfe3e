//! Client-side filter state for the audit review screen.
//!
//! An empty dimension means "no constraint". The same struct doubles as the
//! request body for POST `/procedures/filter` (camelCase on the wire, empty
//! dimensions omitted, so an all-empty filter serializes to `{}`).

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Status dimension: either no constraint or an exact server label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Label(String),
}

impl StatusFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Exact match against the raw label of a record's evaluation status.
    /// A record without an evaluation never matches a label constraint.
    pub fn matches(&self, approval_status: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Label(label) => approval_status == Some(label.as_str()),
        }
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Label(label) => serializer.serialize_str(label),
        }
    }
}

/// Filter dimensions for the procedure set. Reset only by explicit user action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureFilter {
    /// Inclusive lower bound on the execution date (ISO date string).
    pub date_from: Option<String>,
    /// Inclusive upper bound on the execution date (ISO date string).
    pub date_to: Option<String>,
    /// Case-insensitive substring of the doctor name.
    pub doctor_name: Option<String>,
    /// Case-insensitive substring of the procedure code.
    pub procedure_code: Option<String>,
    pub status: StatusFilter,
}

impl ProcedureFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.doctor_name.is_none()
            && self.procedure_code.is_none()
            && self.status.is_all()
    }

    /// Normalize a text input: blank becomes "no constraint".
    pub fn field_from_input(input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl Serialize for ProcedureFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let count = [
            self.date_from.is_some(),
            self.date_to.is_some(),
            self.doctor_name.is_some(),
            self.procedure_code.is_some(),
            !self.status.is_all(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        let mut body = serializer.serialize_struct("ProcedureFilter", count)?;
        if let Some(ref v) = self.date_from {
            body.serialize_field("dateFrom", v)?;
        }
        if let Some(ref v) = self.date_to {
            body.serialize_field("dateTo", v)?;
        }
        if let Some(ref v) = self.doctor_name {
            body.serialize_field("doctorName", v)?;
        }
        if let Some(ref v) = self.procedure_code {
            body.serialize_field("procedureCode", v)?;
        }
        if !self.status.is_all() {
            body.serialize_field("status", &self.status)?;
        }
        body.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::LABEL_APPROVED;

    #[test]
    fn empty_filter_serializes_to_empty_object() {
        let json = serde_json::to_string(&ProcedureFilter::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn populated_filter_uses_camel_case_keys() {
        let filter = ProcedureFilter {
            date_from: Some("2025-01-01".to_string()),
            doctor_name: Some("כהן".to_string()),
            status: StatusFilter::Label(LABEL_APPROVED.to_string()),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["dateFrom"], "2025-01-01");
        assert_eq!(json["doctorName"], "כהן");
        assert_eq!(json["status"], LABEL_APPROVED);
        assert!(json.get("dateTo").is_none());
    }

    #[test]
    fn status_filter_all_matches_everything() {
        assert!(StatusFilter::All.matches(Some(LABEL_APPROVED)));
        assert!(StatusFilter::All.matches(None));
    }

    #[test]
    fn status_filter_label_is_exact() {
        let filter = StatusFilter::Label(LABEL_APPROVED.to_string());
        assert!(filter.matches(Some(LABEL_APPROVED)));
        assert!(!filter.matches(Some("נדחה")));
        assert!(!filter.matches(None));
    }

    #[test]
    fn field_from_input_blank_means_unconstrained() {
        assert_eq!(ProcedureFilter::field_from_input("  "), None);
        assert_eq!(
            ProcedureFilter::field_from_input(" D0220 "),
            Some("D0220".to_string())
        );
    }
}
