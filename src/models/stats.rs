//! Summary statistics snapshot from GET `/stats`.

use serde::{Deserialize, Serialize};

/// One poll's worth of summary counts. Replaced wholesale on each tick and
/// compared by full structural equality, so any extra aggregates the server
/// sends (risk levels, per-doctor counts) are kept in `extra` and take part
/// in the comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub needs_review: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default)]
    pub last_7_days: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_keeps_unrecognized_server_fields() {
        let json = r#"{
            "total": 12, "approved": 7, "needs_review": 3, "rejected": 2,
            "last_7_days": 4,
            "risk_levels": [{"_id": "low", "count": 5}],
            "contraindications": 1
        }"#;
        let snap: StatsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.total, 12);
        assert_eq!(snap.last_7_days, 4);
        assert!(snap.extra.contains_key("risk_levels"));
        assert!(snap.extra.contains_key("contraindications"));
    }

    #[test]
    fn equality_is_structural_over_extras_too() {
        let a: StatsSnapshot =
            serde_json::from_str(r#"{"total": 1, "by_doctor": [{"_id": "כהן", "count": 1}]}"#)
                .unwrap();
        let b: StatsSnapshot =
            serde_json::from_str(r#"{"total": 1, "by_doctor": [{"_id": "כהן", "count": 1}]}"#)
                .unwrap();
        let c: StatsSnapshot =
            serde_json::from_str(r#"{"total": 1, "by_doctor": [{"_id": "כהן", "count": 2}]}"#)
                .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
