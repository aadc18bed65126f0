pub mod catalog;
pub mod config;
pub mod history;
pub mod jobs;
pub mod run;
pub mod suggest;

use std::sync::Arc;

use mealtime_core::{
    Catalog, Config, ConsoleMessenger, CsvHistory, DesktopPopup, Messenger, Popup, Scheduler,
    SchedulerSettings, TwilioMessenger, Weather, WeatherApi,
};

/// Open the history log from config (explicit path or the default
/// `<data_dir>/suggestions.csv`).
pub(crate) fn open_history(config: &Config) -> Result<Arc<CsvHistory>, Box<dyn std::error::Error>> {
    let store = match &config.history_file {
        Some(path) => CsvHistory::with_path(path.clone()),
        None => CsvHistory::open()?,
    };
    Ok(Arc::new(store))
}

/// Wire a scheduler from config. Falls back to console messaging when
/// Twilio credentials are absent.
pub(crate) fn build_scheduler(
    config: &Config,
    history: Arc<CsvHistory>,
) -> Result<Scheduler, Box<dyn std::error::Error>> {
    let settings = SchedulerSettings::from_config(config)?;

    let weather: Arc<dyn Weather> = Arc::new(WeatherApi::new(&config.weather.api_key));
    let messenger: Arc<dyn Messenger> = if config.twilio.is_configured() {
        Arc::new(TwilioMessenger::new(&config.twilio))
    } else {
        eprintln!("Warning: Twilio is not configured; messages go to stdout");
        Arc::new(ConsoleMessenger)
    };
    let popup: Arc<dyn Popup> = Arc::new(DesktopPopup::new());

    let scheduler = Scheduler::new(
        Catalog::builtin(),
        history,
        weather,
        messenger,
        popup,
        settings,
    )?;
    Ok(scheduler)
}
