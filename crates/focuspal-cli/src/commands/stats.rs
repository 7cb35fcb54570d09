use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use focuspal_core::storage::keys;
use focuspal_core::StateStore;

use super::common::{open_store, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print the completion counters and streak as JSON
    Show,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsView {
    completed_sessions: u32,
    sessions_today: u32,
    streak: u32,
    last_session_date: Option<NaiveDate>,
}

pub fn run(action: StatsAction) -> CliResult {
    let StatsAction::Show = action;
    let store = open_store()?;

    let view = StatsView {
        completed_sessions: read_u32(&store, keys::COMPLETED_SESSIONS)?,
        sessions_today: read_u32(&store, keys::SESSIONS_TODAY)?,
        streak: read_u32(&store, keys::STREAK)?,
        last_session_date: store
            .kv_get(keys::LAST_SESSION_DATE)?
            .and_then(|raw| raw.parse().ok()),
    };

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn read_u32(store: &dyn StateStore, key: &str) -> CliResult<u32> {
    Ok(store
        .kv_get(key)?
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0))
}
