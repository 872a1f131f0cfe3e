pub mod enums;
pub mod filters;
pub mod procedure;
pub mod rule;
pub mod stats;

pub use enums::{ApprovalStatus, RuleAction, RuleSeverity};
pub use filters::{ProcedureFilter, StatusFilter};
pub use procedure::{AiAnalysis, EvaluationResult, Procedure, ProcedurePatch};
pub use rule::{ComplianceRule, RuleDraft, RulePatch};
pub use stats::StatsSnapshot;
