//! Status and rule enums shared across flows.
//!
//! The compliance service reports approval verdicts as fixed Hebrew labels.
//! Whether additional labels can occur server-side is undocumented, so every
//! mapping keeps a catch-all `Unknown` instead of assuming exhaustiveness.

use serde::{Deserialize, Serialize};

/// Server label for an approved procedure.
pub const LABEL_APPROVED: &str = "מאושר";
/// Server label for a procedure that needs another look.
pub const LABEL_REQUIRES_REVIEW: &str = "דרוש בדיקה נוספת";
/// Server label for a rejected procedure.
pub const LABEL_REJECTED: &str = "נדחה";

/// Internal tri-state verdict derived from the raw server label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    RequiresReview,
    Rejected,
    Unknown,
}

impl ApprovalStatus {
    /// Map a raw server label to the internal verdict. Anything outside the
    /// three fixed labels is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            LABEL_APPROVED => Self::Approved,
            LABEL_REQUIRES_REVIEW => Self::RequiresReview,
            LABEL_REJECTED => Self::Rejected,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::RequiresReview => "requires_review",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }

    /// The Hebrew display label. `Unknown` has no server label and renders
    /// as a dash.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved => LABEL_APPROVED,
            Self::RequiresReview => LABEL_REQUIRES_REVIEW,
            Self::Rejected => LABEL_REJECTED,
            Self::Unknown => "-",
        }
    }

    /// Fixed sort ordinal: approved < requires-review < rejected, unknown last.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Approved => 0,
            Self::RequiresReview => 1,
            Self::Rejected => 2,
            Self::Unknown => 99,
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a compliance rule does when its condition matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Approve,
    RequireReview,
    Reject,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::RequireReview => "require_review",
            Self::Reject => "reject",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "require_review" => Some(Self::RequireReview),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn all() -> &'static [RuleAction] {
        &[Self::Approve, Self::RequireReview, Self::Reject]
    }
}

/// Severity attached to a compliance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RuleSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn all() -> &'static [RuleSeverity] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_status_from_known_labels() {
        assert_eq!(ApprovalStatus::from_label(LABEL_APPROVED), ApprovalStatus::Approved);
        assert_eq!(
            ApprovalStatus::from_label(LABEL_REQUIRES_REVIEW),
            ApprovalStatus::RequiresReview
        );
        assert_eq!(ApprovalStatus::from_label(LABEL_REJECTED), ApprovalStatus::Rejected);
    }

    #[test]
    fn approval_status_catch_all_unknown() {
        assert_eq!(ApprovalStatus::from_label(""), ApprovalStatus::Unknown);
        assert_eq!(ApprovalStatus::from_label("pending"), ApprovalStatus::Unknown);
        assert_eq!(ApprovalStatus::from_label("מאושר "), ApprovalStatus::Unknown);
    }

    #[test]
    fn approval_status_ordinal_total_order() {
        assert_eq!(ApprovalStatus::Approved.ordinal(), 0);
        assert_eq!(ApprovalStatus::RequiresReview.ordinal(), 1);
        assert_eq!(ApprovalStatus::Rejected.ordinal(), 2);
        assert_eq!(ApprovalStatus::Unknown.ordinal(), 99);
    }

    #[test]
    fn approval_status_label_roundtrip() {
        for status in [
            ApprovalStatus::Approved,
            ApprovalStatus::RequiresReview,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(ApprovalStatus::from_label(status.label()), status);
        }
    }

    #[test]
    fn approval_status_serde_snake_case() {
        let json = serde_json::to_string(&ApprovalStatus::RequiresReview).unwrap();
        assert_eq!(json, "\"requires_review\"");
    }

    #[test]
    fn rule_action_roundtrip() {
        for action in RuleAction::all() {
            assert_eq!(RuleAction::from_str(action.as_str()), Some(*action));
        }
        assert_eq!(RuleAction::from_str("escalate"), None);
    }

    #[test]
    fn rule_severity_roundtrip_and_order() {
        for severity in RuleSeverity::all() {
            assert_eq!(RuleSeverity::from_str(severity.as_str()), Some(*severity));
        }
        assert!(RuleSeverity::Low < RuleSeverity::Critical);
    }
}
