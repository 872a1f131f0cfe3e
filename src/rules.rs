//! Compliance-rule management: list, create, edit, toggle.
//!
//! The list is a display cache; every mutation goes to the server and is
//! followed by a full reload — no optimistic updates.

use crate::api::{ApiError, ComplianceApi};
use crate::models::{ComplianceRule, RuleAction, RuleDraft, RulePatch, RuleSeverity};

pub const MSG_RULE_FIELDS_REQUIRED: &str = "אנא מלא שם כלל ותנאי";

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule name and condition are required")]
    MissingFields,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Inline form state, pre-populated when editing an existing rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleForm {
    pub id: Option<String>,
    pub rule_name: String,
    pub condition: String,
    pub action: RuleAction,
    pub severity: RuleSeverity,
    pub description: String,
    pub procedure_codes: Vec<String>,
    pub is_active: bool,
}

impl Default for RuleForm {
    fn default() -> Self {
        Self {
            id: None,
            rule_name: String::new(),
            condition: String::new(),
            action: RuleAction::RequireReview,
            severity: RuleSeverity::Medium,
            description: String::new(),
            procedure_codes: Vec::new(),
            is_active: true,
        }
    }
}

impl RuleForm {
    pub fn for_rule(rule: &ComplianceRule) -> Self {
        Self {
            id: Some(rule.id.clone()),
            rule_name: rule.rule_name.clone(),
            condition: rule.condition.clone(),
            action: rule.action,
            severity: rule.severity,
            description: rule.description.clone(),
            procedure_codes: rule.procedure_codes.clone(),
            is_active: rule.is_active,
        }
    }

    /// Add a procedure code: trimmed, blanks and duplicates ignored.
    pub fn add_code(&mut self, code: &str) {
        let code = code.trim();
        if !code.is_empty() && !self.procedure_codes.iter().any(|c| c == code) {
            self.procedure_codes.push(code.to_string());
        }
    }

    pub fn remove_code(&mut self, code: &str) {
        self.procedure_codes.retain(|c| c != code);
    }

    fn is_valid(&self) -> bool {
        !self.rule_name.trim().is_empty() && !self.condition.trim().is_empty()
    }

    fn draft(&self) -> RuleDraft {
        RuleDraft {
            rule_name: self.rule_name.clone(),
            condition: self.condition.clone(),
            action: self.action,
            severity: self.severity,
            description: self.description.clone(),
            procedure_codes: self.procedure_codes.clone(),
            is_active: self.is_active,
        }
    }

    fn patch(&self) -> RulePatch {
        RulePatch {
            rule_name: Some(self.rule_name.clone()),
            condition: Some(self.condition.clone()),
            action: Some(self.action),
            severity: Some(self.severity),
            description: Some(self.description.clone()),
            procedure_codes: Some(self.procedure_codes.clone()),
            is_active: Some(self.is_active),
        }
    }
}

/// State behind the rule management screen.
#[derive(Debug, Default)]
pub struct RuleManager {
    rules: Vec<ComplianceRule>,
    form: Option<RuleForm>,
}

impl RuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, api: &dyn ComplianceApi) -> Result<(), ApiError> {
        self.rules = api.list_rules()?;
        Ok(())
    }

    pub fn rules(&self) -> &[ComplianceRule] {
        &self.rules
    }

    pub fn form(&self) -> Option<&RuleForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut RuleForm> {
        self.form.as_mut()
    }

    pub fn begin_create(&mut self) -> &mut RuleForm {
        self.form.insert(RuleForm::default())
    }

    /// Open the inline form pre-populated with the target rule.
    pub fn begin_edit(&mut self, id: &str) -> Option<&mut RuleForm> {
        let rule = self.rules.iter().find(|r| r.id == id)?;
        Some(self.form.insert(RuleForm::for_rule(rule)))
    }

    pub fn cancel(&mut self) {
        self.form = None;
    }

    /// Dispatch create or update based on the form's identifier, then reload
    /// the full list. Validation failures make no network call.
    pub fn save(&mut self, api: &dyn ComplianceApi) -> Result<(), RuleError> {
        let Some(form) = self.form.as_ref() else {
            return Ok(());
        };
        if !form.is_valid() {
            return Err(RuleError::MissingFields);
        }

        match form.id {
            Some(ref id) => api.update_rule(id, &form.patch())?,
            None => api.create_rule(&form.draft())?,
        }

        self.form = None;
        self.load(api)?;
        Ok(())
    }

    /// Flip only the active flag via a partial update, then reload.
    pub fn toggle(&mut self, api: &dyn ComplianceApi, id: &str) -> Result<(), ApiError> {
        let Some(rule) = self.rules.iter().find(|r| r.id == id) else {
            return Ok(());
        };
        let patch = RulePatch {
            is_active: Some(!rule.is_active),
            ..Default::default()
        };
        api.update_rule(id, &patch)?;
        self.load(api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;

    fn sample_rule(id: &str, active: bool) -> ComplianceRule {
        ComplianceRule {
            id: id.to_string(),
            rule_name: "צילום עדכני".to_string(),
            condition: "קיים צילום מהשנה האחרונה".to_string(),
            action: RuleAction::RequireReview,
            severity: RuleSeverity::High,
            description: String::new(),
            procedure_codes: vec!["D3310".to_string()],
            is_active: active,
        }
    }

    #[test]
    fn save_without_id_creates_and_reloads() {
        let api = MockApi::new();
        let mut manager = RuleManager::new();
        let form = manager.begin_create();
        form.rule_name = "כלל חדש".to_string();
        form.condition = "תנאי".to_string();

        manager.save(&api).unwrap();

        assert!(manager.form().is_none());
        assert_eq!(manager.rules().len(), 1);
        assert_eq!(api.calls().create_rule, 1);
        assert_eq!(api.calls().update_rule, 0);
        assert_eq!(api.calls().list_rules, 1, "reload after save");
    }

    #[test]
    fn save_with_id_updates_existing() {
        let api = MockApi::new().with_rules(vec![sample_rule("r1", true)]);
        let mut manager = RuleManager::new();
        manager.load(&api).unwrap();

        let form = manager.begin_edit("r1").unwrap();
        assert_eq!(form.rule_name, "צילום עדכני", "form pre-populates");
        form.rule_name = "שם מעודכן".to_string();

        manager.save(&api).unwrap();
        assert_eq!(api.calls().update_rule, 1);
        assert_eq!(api.calls().create_rule, 0);
        assert_eq!(manager.rules()[0].rule_name, "שם מעודכן");
    }

    #[test]
    fn invalid_form_saves_nothing() {
        let api = MockApi::new();
        let mut manager = RuleManager::new();
        manager.begin_create();

        let err = manager.save(&api).unwrap_err();
        assert!(matches!(err, RuleError::MissingFields));
        assert_eq!(api.calls().create_rule, 0);
        assert!(manager.form().is_some(), "form stays open for correction");
    }

    #[test]
    fn toggle_flips_only_the_active_flag() {
        let api = MockApi::new().with_rules(vec![sample_rule("r1", true)]);
        let mut manager = RuleManager::new();
        manager.load(&api).unwrap();

        manager.toggle(&api, "r1").unwrap();

        let rule = &manager.rules()[0];
        assert!(!rule.is_active);
        assert_eq!(rule.rule_name, "צילום עדכני", "other fields untouched");
        assert_eq!(rule.procedure_codes, vec!["D3310".to_string()]);

        manager.toggle(&api, "r1").unwrap();
        assert!(manager.rules()[0].is_active);
    }

    #[test]
    fn toggle_of_unknown_rule_is_a_noop() {
        let api = MockApi::new();
        let mut manager = RuleManager::new();
        manager.toggle(&api, "ghost").unwrap();
        assert_eq!(api.calls().update_rule, 0);
    }

    #[test]
    fn add_code_trims_and_deduplicates() {
        let mut form = RuleForm::default();
        form.add_code(" D0220 ");
        form.add_code("D0220");
        form.add_code("");
        assert_eq!(form.procedure_codes, vec!["D0220".to_string()]);

        form.remove_code("D0220");
        assert!(form.procedure_codes.is_empty());
    }

    #[test]
    fn cancel_discards_the_form() {
        let mut manager = RuleManager::new();
        manager.begin_create();
        manager.cancel();
        assert!(manager.form().is_none());
    }
}
