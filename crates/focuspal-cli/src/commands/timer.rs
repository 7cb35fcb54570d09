use clap::Subcommand;
use tokio::sync::oneshot;

use focuspal_core::{Command, SessionState};

use super::common::{build_coordinator, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer (only available inside `timer run`)
    Start,
    /// Pause the timer, leaving the remaining time intact
    Pause,
    /// Reset the current session to its full configured duration
    Reset,
    /// Skip to the end of the current session (only available inside `timer run`)
    Skip,
    /// Print the current session state as JSON
    Status,
    /// Run the live timer loop in the foreground until Ctrl-C
    Run {
        /// Start counting down immediately
        #[arg(long)]
        start: bool,
    },
}

pub async fn run(action: TimerAction) -> CliResult {
    match action {
        // A running session needs a live ticker. A one-shot start would
        // persist running=true and apply blocking rules, then exit with
        // nothing counting down, so sites stay blocked forever.
        TimerAction::Start | TimerAction::Skip => Err(needs_foreground_owner()),
        TimerAction::Pause => one_shot(Command::PauseTimer).await,
        TimerAction::Reset => one_shot(Command::ResetTimer).await,
        TimerAction::Status => {
            let mut coordinator = build_coordinator()?;
            print_state(&mut coordinator).await?;
            Ok(())
        }
        TimerAction::Run { start } => run_loop(start).await,
    }
}

fn needs_foreground_owner() -> Box<dyn std::error::Error> {
    "the countdown needs a foreground owner; use `focuspal-cli timer run --start`".into()
}

/// Apply one command against the persisted mirror and print the result.
async fn one_shot(command: Command) -> CliResult {
    let mut coordinator = build_coordinator()?;
    coordinator.handle(command).await;
    print_state(&mut coordinator).await?;
    Ok(())
}

async fn print_state(
    coordinator: &mut focuspal_core::Coordinator,
) -> CliResult<SessionState> {
    let (tx, rx) = oneshot::channel();
    coordinator.handle(Command::GetState(tx)).await;
    let state = rx.await?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(state)
}

/// Foreground reactor: recovers from any previous run, processes commands
/// and ticks until Ctrl-C, and prints every broadcast event as JSON lines.
///
/// The coordinator stays on this task; only the printer and the signal
/// watcher are spawned.
async fn run_loop(start: bool) -> CliResult {
    let mut coordinator = build_coordinator()?;
    coordinator.recover().await;

    let sender = coordinator.sender();
    let mut events = coordinator.events();

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Ok(line) = serde_json::to_string(&event) {
                        println!("{line}");
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                // Lagged; keep printing from where we are.
                Err(_) => continue,
            }
        }
    });

    let shutdown = sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(Command::Shutdown).await;
        }
    });

    if start {
        sender.send(Command::StartTimer).await?;
    }

    coordinator.run().await;
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // These refuse before touching the store or the rule file, so no
    // blocking rule can outlive the process that applied it.
    #[tokio::test]
    async fn start_requires_the_foreground_loop() {
        let err = run(TimerAction::Start).await.unwrap_err();
        assert!(err.to_string().contains("timer run"));
    }

    #[tokio::test]
    async fn skip_requires_the_foreground_loop() {
        let err = run(TimerAction::Skip).await.unwrap_err();
        assert!(err.to_string().contains("timer run"));
    }
}
