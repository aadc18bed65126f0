use clap::Subcommand;
use mealtime_core::{Catalog, TempBand, TimePeriod};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// Show catalog entries, optionally for one band/period
    List {
        /// hot / cold / moderate
        #[arg(long)]
        band: Option<String>,
        /// morning / afternoon / evening
        #[arg(long)]
        period: Option<String>,
    },
    /// Validate catalog completeness (every band x period cell non-empty)
    Check,
}

fn parse_band(s: &str) -> Result<TempBand, Box<dyn std::error::Error>> {
    match s {
        "hot" => Ok(TempBand::Hot),
        "cold" => Ok(TempBand::Cold),
        "moderate" => Ok(TempBand::Moderate),
        other => Err(format!("unknown band: {other}").into()),
    }
}

fn parse_period(s: &str) -> Result<TimePeriod, Box<dyn std::error::Error>> {
    match s {
        "morning" => Ok(TimePeriod::Morning),
        "afternoon" => Ok(TimePeriod::Afternoon),
        "evening" => Ok(TimePeriod::Evening),
        other => Err(format!("unknown period: {other}").into()),
    }
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::builtin();

    match action {
        CatalogAction::List { band, period } => {
            let bands = match band.as_deref() {
                Some(s) => vec![parse_band(s)?],
                None => vec![TempBand::Hot, TempBand::Cold, TempBand::Moderate],
            };
            let periods = match period.as_deref() {
                Some(s) => vec![parse_period(s)?],
                None => TimePeriod::ALL.to_vec(),
            };
            for band in &bands {
                for period in &periods {
                    println!("{band}/{period}:");
                    for entry in catalog.cell(*band, *period) {
                        println!(
                            "  {} [{}, ~{} min]",
                            entry.label, entry.category, entry.duration_min
                        );
                    }
                }
            }
        }
        CatalogAction::Check => {
            catalog.validate()?;
            println!("catalog complete");
        }
    }
    Ok(())
}
