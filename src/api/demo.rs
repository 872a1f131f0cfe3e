//! Demo data set for `--demo` mode: a plausible clinic history so the
//! dashboard is fully explorable without a backend.

use crate::models::enums::{LABEL_APPROVED, LABEL_REJECTED, LABEL_REQUIRES_REVIEW};
use crate::models::{
    AiAnalysis, ComplianceRule, EvaluationResult, Procedure, RuleAction, RuleSeverity,
    StatsSnapshot,
};

use super::MockApi;

fn evaluated(
    id: &str,
    patient_id: &str,
    code: &str,
    name: &str,
    doctor: &str,
    date: &str,
    label: &str,
    risk: &str,
    xray: Option<&str>,
) -> Procedure {
    Procedure {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        procedure_code: code.to_string(),
        procedure_name: name.to_string(),
        doctor_name: doctor.to_string(),
        execution_date: date.to_string(),
        notes: String::new(),
        xray_url: xray.map(str::to_string),
        created_at: format!("{date}T09:30:00"),
        evaluation_result: Some(EvaluationResult {
            approval_status: label.to_string(),
            ai_analysis: AiAnalysis {
                risk_level: risk.to_string(),
                confidence: 0.87,
                findings: "עששת בין-שינית במשנן האחורי".to_string(),
                recommendations: "מעקב תוך 6 חודשים".to_string(),
                medical_justification: label == LABEL_APPROVED,
                contraindications: label == LABEL_REJECTED,
            },
        }),
    }
}

fn demo_procedures() -> Vec<Procedure> {
    vec![
        evaluated(
            "p-01", "204857613", "D0220", "צילום נשך", "ד\"ר רון כהן",
            "2025-07-28", LABEL_APPROVED, "low", Some("xray-p01.png"),
        ),
        evaluated(
            "p-02", "301442877", "D3310", "טיפול שורש קדמי", "ד\"ר רון כהן",
            "2025-07-21", LABEL_REQUIRES_REVIEW, "medium", Some("xray-p02.png"),
        ),
        evaluated(
            "p-03", "208113954", "D7140", "עקירה פשוטה", "ד\"ר נועה לוי",
            "2025-07-14", LABEL_APPROVED, "low", Some("xray-p03.png"),
        ),
        evaluated(
            "p-04", "312008431", "D2740", "כתר חרסינה", "ד\"ר נועה לוי",
            "2025-06-30", LABEL_REJECTED, "high", Some("xray-p04.png"),
        ),
        evaluated(
            "p-05", "204857613", "D1110", "ניקוי אבנית", "ד\"ר אבי מזרחי",
            "2025-06-17", LABEL_APPROVED, "low", None,
        ),
        evaluated(
            "p-06", "287334120", "D3320", "טיפול שורש מלתעה", "ד\"ר רון כהן",
            "2025-06-05", LABEL_APPROVED, "medium", Some("xray-p06.png"),
        ),
        evaluated(
            "p-07", "301442877", "D7210", "עקירה כירורגית", "ד\"ר נועה לוי",
            "2025-05-22", LABEL_REQUIRES_REVIEW, "high", Some("xray-p07.png"),
        ),
        evaluated(
            "p-08", "299310576", "D0330", "צילום פנורמי", "ד\"ר אבי מזרחי",
            "2025-05-09", LABEL_APPROVED, "low", Some("xray-p08.png"),
        ),
    ]
}

fn demo_rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule {
            id: "r-01".to_string(),
            rule_name: "צילום רנטגן עדכני".to_string(),
            condition: "קיים צילום מהשנה האחרונה לפני טיפול שורש".to_string(),
            action: RuleAction::RequireReview,
            severity: RuleSeverity::High,
            description: "טיפול שורש ללא צילום עדכני מחייב בדיקה ידנית".to_string(),
            procedure_codes: vec!["D3310".to_string(), "D3320".to_string()],
            is_active: true,
        },
        ComplianceRule {
            id: "r-02".to_string(),
            rule_name: "הצדקה לעקירה כירורגית".to_string(),
            condition: "ממצא רדיוגרפי התומך בעקירה".to_string(),
            action: RuleAction::Reject,
            severity: RuleSeverity::Critical,
            description: String::new(),
            procedure_codes: vec!["D7210".to_string()],
            is_active: true,
        },
        ComplianceRule {
            id: "r-03".to_string(),
            rule_name: "ניקוי שגרתי".to_string(),
            condition: "לא בוצע ניקוי בחצי השנה האחרונה".to_string(),
            action: RuleAction::Approve,
            severity: RuleSeverity::Low,
            description: "אישור אוטומטי לטיפול מונע".to_string(),
            procedure_codes: vec!["D1110".to_string()],
            is_active: false,
        },
    ]
}

fn demo_stats(procedures: &[Procedure]) -> StatsSnapshot {
    use crate::models::ApprovalStatus;

    let count = |status: ApprovalStatus| {
        procedures.iter().filter(|p| p.status() == status).count() as u64
    };
    StatsSnapshot {
        total: procedures.len() as u64,
        approved: count(ApprovalStatus::Approved),
        needs_review: count(ApprovalStatus::RequiresReview),
        rejected: count(ApprovalStatus::Rejected),
        last_7_days: 2,
        extra: serde_json::Map::new(),
    }
}

/// Build the demo service.
pub fn demo_api() -> MockApi {
    let procedures = demo_procedures();
    let stats = demo_stats(&procedures);
    MockApi::new()
        .with_procedures(procedures)
        .with_rules(demo_rules())
        .with_stats(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ComplianceApi;
    use crate::models::ProcedureFilter;

    #[test]
    fn demo_data_is_internally_consistent() {
        let api = demo_api();
        let procedures = api.filter_procedures(&ProcedureFilter::default()).unwrap();
        let stats = api.fetch_stats().unwrap();
        assert_eq!(stats.total, procedures.len() as u64);
        assert_eq!(
            stats.approved + stats.needs_review + stats.rejected,
            stats.total
        );
        assert!(!api.list_rules().unwrap().is_empty());
    }

    #[test]
    fn demo_procedures_span_multiple_months() {
        let api = demo_api();
        let procedures = api.filter_procedures(&ProcedureFilter::default()).unwrap();
        let mut months: Vec<&str> = procedures
            .iter()
            .map(|p| &p.execution_date[..7])
            .collect();
        months.sort_unstable();
        months.dedup();
        assert!(months.len() >= 3);
    }
}
