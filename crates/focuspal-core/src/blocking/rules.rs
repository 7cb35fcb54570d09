//! URL-match redirect rules and the rule-engine boundary.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RuleEngineError;

/// One redirect rule, matching a blocklist pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRule {
    pub id: u32,
    pub pattern: String,
    pub redirect_target: String,
}

/// Stable rule id derived from the pattern, so editing the blocklist does
/// not churn the ids of unchanged patterns.
pub fn rule_id(pattern: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    pattern.hash(&mut hasher);
    // Fold to a nonzero u32; the engine contract wants small positive ids.
    ((hasher.finish() >> 32) as u32).max(1)
}

/// The exact rule set that should exist for the given inputs.
///
/// Empty when blocking is not desired, and also when the blocklist is
/// empty while blocking is desired (fail open, never block everything).
pub fn desired_rules(patterns: &[String], blocking: bool, redirect_target: &str) -> Vec<BlockRule> {
    if !blocking {
        return Vec::new();
    }
    patterns
        .iter()
        .map(|pattern| BlockRule {
            id: rule_id(pattern),
            pattern: pattern.clone(),
            redirect_target: redirect_target.to_string(),
        })
        .collect()
}

/// External rule engine: applies and removes URL-match redirect rules.
///
/// The core only ever replaces the full set; it never patches rules
/// incrementally.
#[async_trait]
pub trait RuleEngine: Send + Sync {
    async fn list(&self) -> Result<Vec<BlockRule>, RuleEngineError>;
    async fn replace(&self, remove: Vec<u32>, add: Vec<BlockRule>)
        -> Result<(), RuleEngineError>;
}

#[async_trait]
impl<E: RuleEngine> RuleEngine for std::sync::Arc<E> {
    async fn list(&self) -> Result<Vec<BlockRule>, RuleEngineError> {
        (**self).list().await
    }

    async fn replace(
        &self,
        remove: Vec<u32>,
        add: Vec<BlockRule>,
    ) -> Result<(), RuleEngineError> {
        (**self).replace(remove, add).await
    }
}

/// Rule engine publishing the active set as a JSON file in the data dir,
/// for an external enforcement layer to consume.
///
/// Writes go through a temp file and rename so a reader never observes a
/// partial rule set.
pub struct FileRuleEngine {
    path: PathBuf,
}

impl FileRuleEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuleEngine for FileRuleEngine {
    async fn list(&self) -> Result<Vec<BlockRule>, RuleEngineError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| RuleEngineError::ReadFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(RuleEngineError::ReadFailed(e.to_string())),
        }
    }

    async fn replace(
        &self,
        remove: Vec<u32>,
        add: Vec<BlockRule>,
    ) -> Result<(), RuleEngineError> {
        let mut rules = self.list().await?;
        rules.retain(|rule| !remove.contains(&rule.id));
        rules.extend(add);

        let raw = serde_json::to_vec_pretty(&rules).map_err(|e| RuleEngineError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let write_err = |e: std::io::Error| RuleEngineError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        };
        tokio::fs::write(&tmp, raw).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_across_edits() {
        let id = rule_id("*.chat.example/*");
        assert_eq!(id, rule_id("*.chat.example/*"));
        assert!(id >= 1);
        assert_ne!(id, rule_id("news.example/*"));
    }

    #[test]
    fn no_rules_when_blocking_is_off() {
        let patterns = vec!["*.chat.example/*".to_string()];
        assert!(desired_rules(&patterns, false, "focuspal://blocked").is_empty());
    }

    #[test]
    fn empty_blocklist_fails_open() {
        assert!(desired_rules(&[], true, "focuspal://blocked").is_empty());
    }

    #[test]
    fn one_rule_per_pattern() {
        let patterns = vec!["a.example/*".to_string(), "b.example/*".to_string()];
        let rules = desired_rules(&patterns, true, "focuspal://blocked");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern, "a.example/*");
        assert_eq!(rules[0].redirect_target, "focuspal://blocked");
    }

    #[tokio::test]
    async fn file_engine_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FileRuleEngine::new(dir.path().join("rules.json"));
        assert!(engine.list().await.unwrap().is_empty());

        let first = desired_rules(&["a.example/*".to_string()], true, "focuspal://blocked");
        engine.replace(Vec::new(), first.clone()).await.unwrap();
        assert_eq!(engine.list().await.unwrap(), first);

        let second = desired_rules(&["b.example/*".to_string()], true, "focuspal://blocked");
        let remove = first.iter().map(|r| r.id).collect();
        engine.replace(remove, second.clone()).await.unwrap();
        assert_eq!(engine.list().await.unwrap(), second);
    }
}
