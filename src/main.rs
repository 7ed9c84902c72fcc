use anyhow::{anyhow, Context};
use chrono::{Local, NaiveTime, Weekday};
use clap::Parser;
use distance_tracker::sdk::{
    batch::{next_weekday, run_batch, BatchOptions, PairsConfig},
    config::AppConfig,
    report::{write_report, ReportOutcome},
    routing::{GoogleMapsProvider, RouteCache, RouteResolver},
    util::{log::init_logging, rate_limit::maps_limiter},
};
use std::path::PathBuf;

/// Driving, transit and biking distances between configured places
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Only process this pair set (e.g. "us_brazil_routes")
    #[arg(long)]
    pair_id: Option<String>,

    /// CSV file to create or append to
    #[arg(long, default_value = "distances.csv")]
    output: PathBuf,

    /// Day of week for departure time (e.g. "Monday")
    #[arg(long, value_parser = parse_weekday, requires = "departure_time")]
    departure_day: Option<Weekday>,

    /// Time to leave, HH:MM
    #[arg(long, value_parser = parse_time, requires = "departure_day")]
    departure_time: Option<NaiveTime>,

    /// Clear the route cache and recalculate every pair
    #[arg(long)]
    force: bool,

    /// Pair config file [default: $DISTANCE_TRACKER_PAIRS or config.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cache directory [default: $DISTANCE_TRACKER_CACHE_DIR or .cache]
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn parse_weekday(value: &str) -> Result<Weekday, String> {
    value
        .parse()
        .map_err(|_| format!("{value:?} is not a day of the week"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

fn main() -> anyhow::Result<()> {
    init_logging();
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }
    if let Some(path) = cli.config {
        config.pairs_path = path;
    }

    let departure = match (cli.departure_day, cli.departure_time) {
        (Some(day), Some(time)) => {
            let at = next_weekday(Local::now().date_naive(), day).and_time(time);
            log::info!("Using departure time {}", at);
            Some(at)
        }
        _ => None,
    };

    let pairs = PairsConfig::load(&config.pairs_path).map_err(|e| {
        anyhow!(
            "Failed to load pair config {}: {}",
            config.pairs_path.display(),
            e
        )
    })?;
    let cache = RouteCache::open(&config.cache_dir)
        .with_context(|| format!("Failed to open cache in {}", config.cache_dir.display()))?;
    let provider = GoogleMapsProvider::new(
        config.api_key.clone(),
        maps_limiter(config.requests_per_minute),
    )?;
    let mut resolver = RouteResolver::new(provider, cache);

    let options = BatchOptions {
        pair_id: cli.pair_id,
        departure,
        force: cli.force,
    };
    let rows = run_batch(&pairs, &options, &mut resolver)?;

    match write_report(&cli.output, &rows)? {
        ReportOutcome::Empty => log::info!("No new routes to process"),
        ReportOutcome::Created => log::info!(
            "Wrote {} new routes to new file {}",
            rows.len(),
            cli.output.display()
        ),
        ReportOutcome::Appended => log::info!(
            "Added {} new routes to {}",
            rows.len(),
            cli.output.display()
        ),
    }

    Ok(())
}
