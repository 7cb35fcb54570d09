use clap::Subcommand;

use focuspal_core::storage::keys;
use focuspal_core::{Command, StateStore};

use super::common::{build_coordinator, open_store, CliResult};

#[derive(Subcommand)]
pub enum BlocklistAction {
    /// Add a URL-match pattern to the blocklist
    Add { pattern: String },
    /// Remove a pattern from the blocklist
    Remove { pattern: String },
    /// Print the blocklist as JSON
    List,
    /// Remove all patterns
    Clear,
}

pub async fn run(action: BlocklistAction) -> CliResult {
    let store = open_store()?;
    let mut patterns = load(&store)?;

    let changed = match &action {
        BlocklistAction::Add { pattern } => add_pattern(&mut patterns, pattern),
        BlocklistAction::Remove { pattern } => remove_pattern(&mut patterns, pattern),
        BlocklistAction::Clear => {
            let was_empty = patterns.is_empty();
            patterns.clear();
            !was_empty
        }
        BlocklistAction::List => false,
    };

    if changed {
        store.kv_set(keys::BLOCKED_SITES, &serde_json::to_string(&patterns)?)?;
        drop(store);
        // Reconcile immediately so a mid-focus edit takes effect now.
        let mut coordinator = build_coordinator()?;
        coordinator.handle(Command::BlocklistChanged).await;
    }

    println!("{}", serde_json::to_string_pretty(&patterns)?);
    Ok(())
}

fn load(store: &dyn StateStore) -> CliResult<Vec<String>> {
    Ok(store
        .kv_get(keys::BLOCKED_SITES)?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default())
}

/// Ordered, duplicate-free insert.
fn add_pattern(patterns: &mut Vec<String>, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() || patterns.iter().any(|p| p == pattern) {
        return false;
    }
    patterns.push(pattern.to_string());
    true
}

fn remove_pattern(patterns: &mut Vec<String>, pattern: &str) -> bool {
    let pattern = pattern.trim();
    let before = patterns.len();
    patterns.retain(|p| p != pattern);
    patterns.len() != before
}
