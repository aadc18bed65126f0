use chrono::Local;
use mealtime_core::scheduler::recovery::recover_jobs;
use mealtime_core::{Config, HistoryStore};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let history = super::open_history(&config)?;

    let records = history.read_all()?;
    let jobs = recover_jobs(&records, Local::now().naive_local());
    println!("{}", serde_json::to_string_pretty(&jobs)?);
    Ok(())
}
