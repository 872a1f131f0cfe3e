//! Compliance rules as served by the `/compliance-rules` collection.

use serde::{Deserialize, Serialize};

use super::enums::{RuleAction, RuleSeverity};

fn default_active() -> bool {
    true
}

/// A compliance rule. Lifecycle is fully server-owned; the client caches a
/// list for display and editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRule {
    #[serde(default)]
    pub id: String,
    pub rule_name: String,
    /// Free-text condition the rule checks.
    pub condition: String,
    pub action: RuleAction,
    pub severity: RuleSeverity,
    #[serde(default)]
    pub description: String,
    /// Procedure codes the rule applies to; empty means all.
    #[serde(default)]
    pub procedure_codes: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Body for creating a rule (POST). The server assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct RuleDraft {
    pub rule_name: String,
    pub condition: String,
    pub action: RuleAction,
    pub severity: RuleSeverity,
    pub description: String,
    pub procedure_codes: Vec<String>,
    pub is_active: bool,
}

/// Partial update for a rule (PUT). Only populated fields reach the wire,
/// so toggling flips `is_active` alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<RuleSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_deserializes_with_defaults() {
        let json = r#"{
            "rule_name": "בדיקת צילום רנטגן עדכני",
            "condition": "צילום מהשנה האחרונה",
            "action": "require_review",
            "severity": "high"
        }"#;
        let rule: ComplianceRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.action, RuleAction::RequireReview);
        assert_eq!(rule.severity, RuleSeverity::High);
        assert!(rule.is_active);
        assert!(rule.procedure_codes.is_empty());
    }

    #[test]
    fn toggle_patch_carries_only_active_flag() {
        let patch = RulePatch {
            is_active: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"is_active":false}"#);
    }

    #[test]
    fn rule_action_serializes_snake_case() {
        let draft = RuleDraft {
            rule_name: "r".to_string(),
            condition: "c".to_string(),
            action: RuleAction::Approve,
            severity: RuleSeverity::Low,
            description: String::new(),
            procedure_codes: vec!["D0220".to_string()],
            is_active: true,
        };
        let json: serde_json::Value = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["action"], "approve");
        assert_eq!(json["severity"], "low");
    }
}
