use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mealtime-cli", version, about = "Mealtime CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot suggestion for a user, scheduled again for tomorrow
    Suggest(commands::suggest::SuggestArgs),
    /// Run the recurring scheduler (recovers jobs from history first)
    Run(commands::run::RunArgs),
    /// Show the jobs recovery would arm, without running
    Jobs,
    /// History log inspection
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Catalog inspection
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Suggest(args) => commands::suggest::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Jobs => commands::jobs::run(),
        Commands::History { action } => commands::history::run(action),
        Commands::Catalog { action } => commands::catalog::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
