mod rules;
mod synchronizer;

pub use rules::{desired_rules, rule_id, BlockRule, FileRuleEngine, RuleEngine};
pub use synchronizer::reconcile;
