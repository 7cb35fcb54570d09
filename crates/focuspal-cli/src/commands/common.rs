//! Shared wiring for CLI commands.

use focuspal_core::{
    data_dir, Config, Coordinator, CoreError, FileRuleEngine, GatedNotifier, LogNotifier,
    SqliteStore, TokioTicker,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn open_store() -> Result<SqliteStore, CoreError> {
    SqliteStore::open()
}

/// Build a coordinator over the on-disk store and the file rule engine.
pub fn build_coordinator() -> Result<Coordinator, CoreError> {
    let config = Config::load().unwrap_or_else(|error| {
        tracing::warn!(%error, "falling back to default configuration");
        Config::default()
    });
    let store = SqliteStore::open()?;
    let rules = FileRuleEngine::new(data_dir()?.join("rules.json"));
    let notifier = GatedNotifier::new(
        LogNotifier,
        config.notifications.enabled,
        config.notifications.audio_sync,
    );
    Coordinator::new(
        Box::new(store),
        Box::new(rules),
        Box::new(notifier),
        Box::new(TokioTicker::new()),
        config.blocking.redirect_target,
    )
}
