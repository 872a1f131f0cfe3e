//! CSV export of the full procedure list.
//!
//! A local artifact, no server round-trip: fixed Hebrew header set, every
//! cell double-quoted, `medical_procedures_report_<unix-timestamp>.csv` in
//! the exports directory.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config;
use crate::models::Procedure;

/// Header row, in display order.
pub const CSV_HEADERS: [&str; 6] = [
    "תאריך",
    "מטופל",
    "פרוצדורה",
    "רופא",
    "סטטוס",
    "רמת סיכון",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Quote one cell, doubling embedded quotes.
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row(p: &Procedure) -> [String; 6] {
    let (status, risk) = match p.evaluation_result {
        Some(ref result) => (
            result.approval_status.clone(),
            result.ai_analysis.risk_level.clone(),
        ),
        None => (String::new(), String::new()),
    };
    [
        p.report_date().to_string(),
        p.patient_id.clone(),
        p.procedure_name.clone(),
        p.doctor_name.clone(),
        status,
        risk,
    ]
}

/// Serialize the list: header line plus one line per record.
pub fn render_csv(procedures: &[Procedure]) -> String {
    let mut lines = Vec::with_capacity(procedures.len() + 1);
    lines.push(
        CSV_HEADERS
            .iter()
            .map(|h| quote(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for p in procedures {
        lines.push(row(p).iter().map(|c| quote(c)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

/// Timestamped export file name.
pub fn export_file_name() -> String {
    format!("medical_procedures_report_{}.csv", Utc::now().timestamp())
}

/// Write the report into `dir` (created on demand); returns the file path.
pub fn export(procedures: &[Procedure], dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name());
    std::fs::write(&path, render_csv(procedures))?;
    tracing::info!(path = %path.display(), records = procedures.len(), "Report exported");
    Ok(path)
}

/// Export into the application's exports directory.
pub fn export_to_default(procedures: &[Procedure]) -> Result<PathBuf, ExportError> {
    export(procedures, &config::exports_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::LABEL_APPROVED;
    use crate::models::{AiAnalysis, EvaluationResult};

    fn sample(doctor: &str) -> Procedure {
        Procedure {
            patient_id: "204857613".to_string(),
            procedure_name: "טיפול שורש".to_string(),
            doctor_name: doctor.to_string(),
            execution_date: "2025-05-01".to_string(),
            evaluation_result: Some(EvaluationResult {
                approval_status: LABEL_APPROVED.to_string(),
                ai_analysis: AiAnalysis {
                    risk_level: "low".to_string(),
                    ..Default::default()
                },
            }),
            ..Default::default()
        }
    }

    #[test]
    fn two_records_produce_three_lines_all_quoted() {
        let csv = render_csv(&[sample("ד\"ר לוי"), sample("כהן")]);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(line.starts_with('"'));
            assert!(line.ends_with('"'));
            // Six fields per line.
            assert_eq!(line.matches("\",\"").count(), 5);
        }
    }

    #[test]
    fn header_order_is_fixed() {
        let csv = render_csv(&[]);
        assert_eq!(
            csv,
            "\"תאריך\",\"מטופל\",\"פרוצדורה\",\"רופא\",\"סטטוס\",\"רמת סיכון\""
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let csv = render_csv(&[sample("ד\"ר לוי")]);
        assert!(csv.contains("\"ד\"\"ר לוי\""));
    }

    #[test]
    fn unevaluated_record_exports_empty_status_cells() {
        let p = Procedure {
            execution_date: "2025-05-01".to_string(),
            patient_id: "1".to_string(),
            ..Default::default()
        };
        let csv = render_csv(&[p]);
        let data_line = csv.split('\n').nth(1).unwrap();
        assert!(data_line.ends_with("\"\",\"\""));
    }

    #[test]
    fn export_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export(&[sample("כהן")], dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("medical_procedures_report_"));
        assert!(name.ends_with(".csv"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_csv(&[sample("כהן")]));
    }

    #[test]
    fn export_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = export(&[], &nested).unwrap();
        assert!(path.exists());
    }
}
