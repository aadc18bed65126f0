use clap::Subcommand;
use mealtime_core::history::periods_for;
use mealtime_core::{Config, HistoryStore, TIMESTAMP_FORMAT};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List history records, optionally filtered to one user
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the periods a user has received suggestions in
    Periods {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let history = super::open_history(&config)?;
    let records = history.read_all()?;

    match action {
        HistoryAction::List { name, phone, json } => {
            let filtered: Vec<_> = records
                .into_iter()
                .filter(|r| name.as_deref().map_or(true, |n| r.name == n))
                .filter(|r| phone.as_deref().map_or(true, |p| r.phone == p))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&filtered)?);
            } else {
                for r in filtered {
                    println!(
                        "{}  {}  {}  {}  {}",
                        r.sent_at.format(TIMESTAMP_FORMAT),
                        r.name,
                        r.period,
                        r.band,
                        r.food
                    );
                }
            }
        }
        HistoryAction::Periods { name, phone } => {
            for period in periods_for(&records, &name, &phone) {
                println!("{period}");
            }
        }
    }
    Ok(())
}
