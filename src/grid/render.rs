//! Field renderers: one strategy per declared field kind.
//!
//! Rendering is pure — a record plus a column spec yields a [`CellView`] the
//! shell can draw however it likes. The same views feed the global text
//! filter, so what the user sees is what the filter searches.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::ApprovalStatus;

use super::{ColumnSpec, FieldKind, header_label};

pub const PLACEHOLDER: &str = "-";
pub const INVALID_DATE: &str = "תאריך לא תקף";
pub const FLAG_YES: &str = "כן";
pub const FLAG_NO: &str = "לא";

/// A rendered cell, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    /// Missing value.
    Empty,
    Text(String),
    /// Temporal value split across two lines.
    DateTime { date: String, time: String },
    InvalidDate,
    /// Status badge carrying the raw label and the derived verdict.
    Status { label: String, status: ApprovalStatus },
    /// Expandable one-row sub-table of AI-analysis attributes.
    Analysis {
        status: ApprovalStatus,
        fields: Vec<(String, String)>,
    },
    /// Free text revealed per row on demand.
    Notes(String),
    /// Download trigger for a stored file.
    FileRef(String),
    Flag(bool),
}

/// Parse the date formats the service emits: RFC 3339, naive datetime, or a
/// bare ISO date.
pub fn parse_temporal(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

fn flag_label(value: bool) -> &'static str {
    if value {
        FLAG_YES
    } else {
        FLAG_NO
    }
}

/// Generic coercion for values without a dedicated renderer.
fn generic_text(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => flag_label(*b).to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn status_of_record(record: &Value) -> (String, ApprovalStatus) {
    let label = record
        .get("evaluation_result")
        .and_then(|e| e.get("approval_status"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let status = ApprovalStatus::from_label(&label);
    (label, status)
}

/// Render one cell of a record through the column's declared strategy.
pub fn render_cell(record: &Value, column: &ColumnSpec) -> CellView {
    let value = record.get(&column.key).unwrap_or(&Value::Null);

    match column.kind {
        FieldKind::DateTime => match value.as_str() {
            None | Some("") => CellView::Empty,
            Some(raw) => match parse_temporal(raw) {
                Some(dt) => CellView::DateTime {
                    date: dt.format("%d.%m.%Y").to_string(),
                    time: dt.format("%H:%M").to_string(),
                },
                None => CellView::InvalidDate,
            },
        },
        FieldKind::Status => {
            let label = value.as_str().unwrap_or_default().to_string();
            if label.is_empty() {
                CellView::Empty
            } else {
                let status = ApprovalStatus::from_label(&label);
                CellView::Status { label, status }
            }
        }
        FieldKind::Analysis => {
            let Some(result) = record.get(&column.key).filter(|v| v.is_object()) else {
                return CellView::Empty;
            };
            let (_, status) = status_of_record(record);
            let fields = result
                .get("ai_analysis")
                .and_then(Value::as_object)
                .map(|analysis| {
                    analysis
                        .iter()
                        .map(|(key, v)| (header_label(key).to_string(), generic_text(v)))
                        .collect()
                })
                .unwrap_or_default();
            CellView::Analysis { status, fields }
        }
        FieldKind::Notes => match value.as_str() {
            None | Some("") => CellView::Empty,
            Some(text) => CellView::Notes(text.to_string()),
        },
        FieldKind::FileRef => match value.as_str() {
            None | Some("") => CellView::Empty,
            Some(name) => CellView::FileRef(name.to_string()),
        },
        FieldKind::Flag => match value.as_bool() {
            Some(b) => CellView::Flag(b),
            None => CellView::Empty,
        },
        FieldKind::Text => {
            if value.is_null() {
                CellView::Empty
            } else {
                CellView::Text(generic_text(value))
            }
        }
    }
}

/// The text the global filter searches for this cell.
pub fn search_text(record: &Value, column: &ColumnSpec) -> String {
    match render_cell(record, column) {
        CellView::Empty => String::new(),
        CellView::Text(s) | CellView::Notes(s) | CellView::FileRef(s) => s,
        CellView::DateTime { date, time } => format!("{date} {time}"),
        CellView::InvalidDate => INVALID_DATE.to_string(),
        CellView::Status { label, .. } => label,
        CellView::Analysis { fields, .. } => fields
            .into_iter()
            .map(|(_, v)| v)
            .collect::<Vec<_>>()
            .join(" "),
        CellView::Flag(b) => flag_label(b).to_string(),
    }
}

/// Short single-line summary, for grid cells that expand on demand.
pub fn cell_summary(view: &CellView) -> String {
    match view {
        CellView::Empty => PLACEHOLDER.to_string(),
        CellView::Text(s) => s.clone(),
        CellView::DateTime { date, time } => format!("{date} {time}"),
        CellView::InvalidDate => INVALID_DATE.to_string(),
        CellView::Status { label, .. } => label.clone(),
        CellView::Analysis { status, .. } => status.label().to_string(),
        CellView::Notes(_) => "הצג".to_string(),
        CellView::FileRef(name) => name.clone(),
        CellView::Flag(b) => flag_label(*b).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col(key: &str, kind: FieldKind) -> ColumnSpec {
        ColumnSpec::new(key, header_label(key), kind, false)
    }

    #[test]
    fn datetime_splits_date_and_time() {
        let record = json!({"created_at": "2025-06-01T09:30:00"});
        let view = render_cell(&record, &col("created_at", FieldKind::DateTime));
        assert_eq!(
            view,
            CellView::DateTime {
                date: "01.06.2025".to_string(),
                time: "09:30".to_string()
            }
        );
    }

    #[test]
    fn bare_date_renders_midnight() {
        let record = json!({"execution_date": "2025-06-01"});
        let view = render_cell(&record, &col("execution_date", FieldKind::DateTime));
        assert_eq!(
            view,
            CellView::DateTime {
                date: "01.06.2025".to_string(),
                time: "00:00".to_string()
            }
        );
    }

    #[test]
    fn unparsable_date_is_flagged_not_fatal() {
        let record = json!({"execution_date": "מחר"});
        let view = render_cell(&record, &col("execution_date", FieldKind::DateTime));
        assert_eq!(view, CellView::InvalidDate);
    }

    #[test]
    fn missing_value_renders_empty() {
        let record = json!({});
        assert_eq!(
            render_cell(&record, &col("notes", FieldKind::Notes)),
            CellView::Empty
        );
        assert_eq!(
            render_cell(&record, &col("xray_url", FieldKind::FileRef)),
            CellView::Empty
        );
    }

    #[test]
    fn booleans_render_hebrew_flags() {
        let record = json!({"follow_up": true});
        assert_eq!(
            render_cell(&record, &col("follow_up", FieldKind::Flag)),
            CellView::Flag(true)
        );
        assert_eq!(cell_summary(&CellView::Flag(true)), FLAG_YES);
        assert_eq!(cell_summary(&CellView::Flag(false)), FLAG_NO);
    }

    #[test]
    fn analysis_cell_collects_labelled_fields() {
        let record = json!({
            "evaluation_result": {
                "approval_status": "מאושר",
                "ai_analysis": {
                    "risk_level": "low",
                    "medical_justification": true
                }
            }
        });
        let view = render_cell(&record, &col("evaluation_result", FieldKind::Analysis));
        let CellView::Analysis { status, fields } = view else {
            panic!("expected analysis view");
        };
        assert_eq!(status, ApprovalStatus::Approved);
        assert!(fields.contains(&("רמת סיכון".to_string(), "low".to_string())));
        assert!(fields.contains(&("הצדקה רפואית".to_string(), FLAG_YES.to_string())));
    }

    #[test]
    fn search_text_reflects_rendered_content() {
        let record = json!({
            "doctor_name": "ד\"ר רון כהן",
            "created_at": "2025-06-01T09:30:00"
        });
        assert_eq!(
            search_text(&record, &col("doctor_name", FieldKind::Text)),
            "ד\"ר רון כהן"
        );
        assert_eq!(
            search_text(&record, &col("created_at", FieldKind::DateTime)),
            "01.06.2025 09:30"
        );
    }
}
