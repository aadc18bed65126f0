use std::sync::Arc;

use chrono::Local;
use clap::Args;
use mealtime_core::{Config, FoodCategory};

#[derive(Args)]
pub struct RunArgs {
    /// Register a user for all three canonical periods before starting:
    /// NAME PHONE LOCATION
    #[arg(long, num_args = 3, value_names = ["NAME", "PHONE", "LOCATION"])]
    pub register: Option<Vec<String>>,
    /// Category preference for --register
    #[arg(long)]
    pub category: Option<String>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let history = super::open_history(&config)?;
    let scheduler = Arc::new(super::build_scheduler(&config, history)?);

    let now = Local::now().naive_local();
    let recovered = scheduler.recover(now)?;
    println!("Recovered {recovered} job(s) from history");

    if let Some(parts) = &args.register {
        let category = args
            .category
            .as_deref()
            .map(FoodCategory::parse)
            .transpose()?;
        let keys = scheduler.register_all(&parts[0], &parts[1], &parts[2], category, now);
        println!("Registered {} for {} period(s)", parts[0], keys.len());
    }

    println!("Scheduler running ({} job(s)); Ctrl-C to stop", scheduler.table().len());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(scheduler.run());
    Ok(())
}
