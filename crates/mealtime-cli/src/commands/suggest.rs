use std::sync::Arc;

use chrono::Local;
use clap::Args;
use mealtime_core::history::user_exists;
use mealtime_core::{Config, FoodCategory, HistoryStore};

#[derive(Args)]
pub struct SuggestArgs {
    /// User name
    #[arg(long)]
    pub name: String,
    /// Contact number (with country code, e.g. +91...)
    #[arg(long)]
    pub phone: String,
    /// Location (city name)
    #[arg(long)]
    pub location: String,
    /// Category preference: full meal / quick bite / dessert / starter /
    /// drink / side
    #[arg(long)]
    pub category: Option<String>,
}

pub fn run(args: SuggestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let history = super::open_history(&config)?;
    let scheduler = super::build_scheduler(&config, Arc::clone(&history))?;

    let category = args
        .category
        .as_deref()
        .map(FoodCategory::parse)
        .transpose()?;

    let records = history.read_all()?;
    if category.is_none() && !user_exists(&records, &args.name, &args.phone) {
        println!(
            "Welcome! Pass --category ({}) to set a one-time preference.",
            FoodCategory::NAMES.join(" / ")
        );
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let now = Local::now().naive_local();
    let report = runtime.block_on(scheduler.suggest_now(
        &args.name,
        &args.phone,
        &args.location,
        category,
        now,
    ))?;

    println!(
        "Suggested {} food: {}",
        report.record.period, report.record.food
    );
    println!(
        "Weather in {}: {} at {}°C ({})",
        report.record.location, report.record.weather, report.record.temperature, report.record.band
    );
    println!(
        "Next {} suggestion scheduled for tomorrow at {}",
        report.record.period,
        report.record.sent_at.format("%H:%M")
    );
    Ok(())
}
