//! Reconciliation of the external rule set against desired blocking state.

use super::rules::{desired_rules, RuleEngine};
use crate::error::RuleEngineError;

/// Recompute the rule set that should exist and replace the external set
/// with it wholesale, so no stale rule survives the call.
///
/// Returns the number of rules now active. Callers treat failures as
/// transient: log and continue, never crash the state machine.
pub async fn reconcile(
    engine: &dyn RuleEngine,
    patterns: &[String],
    blocking: bool,
    redirect_target: &str,
) -> Result<usize, RuleEngineError> {
    let existing = engine.list().await?;
    let desired = desired_rules(patterns, blocking, redirect_target);
    let remove: Vec<u32> = existing.iter().map(|rule| rule.id).collect();
    let count = desired.len();
    engine.replace(remove, desired).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocking::BlockRule;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fake engine recording the applied set.
    #[derive(Default)]
    struct FakeEngine {
        rules: Mutex<Vec<BlockRule>>,
        replace_calls: Mutex<u32>,
    }

    #[async_trait]
    impl RuleEngine for FakeEngine {
        async fn list(&self) -> Result<Vec<BlockRule>, RuleEngineError> {
            Ok(self.rules.lock().unwrap().clone())
        }

        async fn replace(
            &self,
            remove: Vec<u32>,
            add: Vec<BlockRule>,
        ) -> Result<(), RuleEngineError> {
            let mut rules = self.rules.lock().unwrap();
            rules.retain(|rule| !remove.contains(&rule.id));
            rules.extend(add);
            *self.replace_calls.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn blocking_on_applies_one_rule_per_pattern() {
        let engine = FakeEngine::default();
        let patterns = vec!["*.chat.example/*".to_string()];
        let count = reconcile(&engine, &patterns, true, "focuspal://blocked")
            .await
            .unwrap();
        assert_eq!(count, 1);
        let rules = engine.list().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern, "*.chat.example/*");
    }

    #[tokio::test]
    async fn blocking_off_removes_everything() {
        let engine = FakeEngine::default();
        let patterns = vec!["a.example/*".to_string(), "b.example/*".to_string()];
        reconcile(&engine, &patterns, true, "focuspal://blocked")
            .await
            .unwrap();
        assert_eq!(engine.list().await.unwrap().len(), 2);

        let count = reconcile(&engine, &patterns, false, "focuspal://blocked")
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(engine.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_blocklist_while_blocking_yields_empty_set() {
        let engine = FakeEngine::default();
        reconcile(
            &engine,
            &["a.example/*".to_string()],
            true,
            "focuspal://blocked",
        )
        .await
        .unwrap();

        let count = reconcile(&engine, &[], true, "focuspal://blocked")
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(engine.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let engine = FakeEngine::default();
        let patterns = vec!["a.example/*".to_string()];
        reconcile(&engine, &patterns, true, "focuspal://blocked")
            .await
            .unwrap();
        let after_first = engine.list().await.unwrap();
        reconcile(&engine, &patterns, true, "focuspal://blocked")
            .await
            .unwrap();
        assert_eq!(engine.list().await.unwrap(), after_first);
    }
}
