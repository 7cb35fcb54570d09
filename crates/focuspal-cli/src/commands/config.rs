use clap::Subcommand;
use serde::Serialize;

use focuspal_core::storage::keys;
use focuspal_core::{Command, Durations, StateStore};

use super::common::{build_coordinator, open_store, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective interval durations as JSON
    Show,
    /// Set the focus interval length in minutes
    SetFocus { minutes: u32 },
    /// Set the break interval length in minutes
    SetBreak { minutes: u32 },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DurationsView {
    focus_minutes: u32,
    break_minutes: u32,
}

pub async fn run(action: ConfigAction) -> CliResult {
    let store = open_store()?;

    let changed = match &action {
        ConfigAction::Show => false,
        ConfigAction::SetFocus { minutes } => {
            set_minutes(&store, keys::FOCUS_TIME, *minutes)?;
            true
        }
        ConfigAction::SetBreak { minutes } => {
            set_minutes(&store, keys::BREAK_TIME, *minutes)?;
            true
        }
    };

    let durations = Durations::from_store_values(
        store.kv_get(keys::FOCUS_TIME)?.as_deref(),
        store.kv_get(keys::BREAK_TIME)?.as_deref(),
    );
    drop(store);

    if changed {
        // Re-derive the idle display time from the new durations.
        let mut coordinator = build_coordinator()?;
        coordinator.handle(Command::TimerSettingsChanged).await;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&DurationsView {
            focus_minutes: durations.focus_min,
            break_minutes: durations.break_min,
        })?
    );
    Ok(())
}

fn set_minutes(store: &dyn StateStore, key: &str, minutes: u32) -> CliResult {
    if minutes == 0 {
        return Err("minutes must be a positive integer".into());
    }
    store.kv_set(key, &minutes.to_string())?;
    Ok(())
}
