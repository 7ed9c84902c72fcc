use super::links::maps_url;
use super::report::ReportRow;
use super::routing::{
    Address, CacheError, RouteRecord, RouteResolver, RoutingProvider, TravelMode,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Deserialize;
use std::{collections::BTreeMap, error::Error, fs, path::Path};

/// A named location in the pair config.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub name: String,
    pub location: Address,
    #[serde(default)]
    pub url: Option<String>,
}

/// Every origin is routed to every destination.
#[derive(Debug, Clone, Deserialize)]
pub struct PairSet {
    pub origins: Vec<Place>,
    pub destinations: Vec<Place>,
}

/// The pair config file: pair id -> origins and destinations. Pairs run in id order.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PairsConfig {
    pub pairs: BTreeMap<String, PairSet>,
}

impl PairsConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Only process this pair set.
    pub pair_id: Option<String>,
    pub departure: Option<NaiveDateTime>,
    /// Clear the route cache and resolve every pair again.
    pub force: bool,
}

/// The next `weekday` strictly after `today`; a week ahead if today is that day.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let days_ahead = (weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    today + Duration::days(days_ahead)
}

/// Resolves every configured pair that is not already cached and returns one
/// report row per newly resolved pair. Unresolvable pairs are logged and skipped.
pub fn run_batch<P: RoutingProvider>(
    config: &PairsConfig,
    options: &BatchOptions,
    resolver: &mut RouteResolver<P>,
) -> Result<Vec<ReportRow>, CacheError> {
    if options.force {
        log::info!("Force flag set, clearing route cache");
        resolver.cache_mut().clear_route_cache()?;
    }

    if let Some(pair_id) = &options.pair_id {
        if !config.pairs.contains_key(pair_id) {
            log::warn!("No pair set named {} in config", pair_id);
        }
    }

    let departure = options.departure.as_ref();
    let mut rows = Vec::new();

    let selected = config
        .pairs
        .iter()
        .filter(|(id, _)| options.pair_id.as_ref().map_or(true, |wanted| wanted == *id));

    for (pair_id, pair) in selected {
        for (origin_index, origin) in pair.origins.iter().enumerate() {
            for (destination_index, destination) in pair.destinations.iter().enumerate() {
                if !options.force
                    && resolver
                        .cached(&origin.location, &destination.location, departure)
                        .is_some()
                {
                    log::info!(
                        "Skipping cached route: {} -> {}",
                        origin.name,
                        destination.name
                    );
                    continue;
                }

                let Some(record) =
                    resolver.resolve(&origin.location, &destination.location, departure)?
                else {
                    log::warn!(
                        "Could not resolve route: {} -> {}",
                        origin.name,
                        destination.name
                    );
                    continue;
                };

                rows.push(report_row(
                    pair_id,
                    (origin_index, origin),
                    (destination_index, destination),
                    record,
                ));
            }
        }
    }

    Ok(rows)
}

fn report_row(
    pair_id: &str,
    (origin_index, origin): (usize, &Place),
    (destination_index, destination): (usize, &Place),
    record: RouteRecord,
) -> ReportRow {
    let link = |mode| maps_url(&origin.location, &destination.location, mode);
    ReportRow {
        pair_id: pair_id.to_string(),
        origin_index,
        destination_index,
        origin_name: origin.name.clone(),
        destination_name: destination.name.clone(),
        origin_address: origin.location.to_string(),
        destination_address: destination.location.to_string(),
        origin_url: origin.url.clone().unwrap_or_default(),
        destination_url: destination.url.clone().unwrap_or_default(),
        origin_plus_code: record.origin_plus_code,
        destination_plus_code: record.destination_plus_code,
        driving_distance: record.driving_distance,
        driving_duration: record.driving_duration,
        driving_url: link(TravelMode::Driving),
        transit_distance: record.transit_distance,
        transit_duration: record.transit_duration,
        transit_hops: record.transit_steps,
        transit_url: link(TravelMode::Transit),
        biking_distance: record.biking_distance,
        biking_duration: record.biking_duration,
        biking_url: link(TravelMode::Bicycling),
    }
}
