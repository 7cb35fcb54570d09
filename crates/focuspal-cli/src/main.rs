use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focuspal-cli", version, about = "FocusPal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Blocklist management
    Blocklist {
        #[command(subcommand)]
        action: commands::blocklist::BlocklistAction,
    },
    /// Interval duration settings
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Streak and daily statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Blocklist { action } => commands::blocklist::run(action).await,
        Commands::Config { action } => commands::config::run(action).await,
        Commands::Stats { action } => commands::stats::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
