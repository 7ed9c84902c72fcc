use super::address::{Address, Coord};
use super::cache::RouteCache;
use super::error::{CacheError, RoutingError};
use super::service::{DirectionsRequest, Itinerary, RoutingProvider, StepMode, TravelMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Minutes added to a transit itinerary's score per transit step.
pub const TRANSFER_PENALTY_MINUTES: f64 = 15.0;

/// Weight applied to walking minutes when scoring a transit itinerary.
pub const WALKING_WEIGHT: f64 = 0.5;

/// Driving, transit and biking summary for one origin/destination pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteRecord {
    pub driving_distance: String,
    pub driving_duration: String,
    pub transit_distance: String,
    pub transit_duration: String,
    /// Number of transit steps in the chosen itinerary.
    pub transit_steps: u32,
    pub biking_distance: String,
    pub biking_duration: String,
    pub origin_coords: Coord,
    pub destination_coords: Coord,
    pub origin_plus_code: Option<String>,
    pub destination_plus_code: Option<String>,
}

pub fn transfer_count(itinerary: &Itinerary) -> u32 {
    itinerary
        .steps
        .iter()
        .filter(|step| step.mode == StepMode::Transit)
        .count() as u32
}

pub fn walking_minutes(itinerary: &Itinerary) -> f64 {
    let secs: u64 = itinerary
        .steps
        .iter()
        .filter(|step| step.mode == StepMode::Walking)
        .map(|step| step.duration_secs)
        .sum();
    secs as f64 / 60.0
}

/// Lower is better: travel time, plus a fixed penalty per transfer and half of
/// the time spent walking.
pub fn transit_score(itinerary: &Itinerary) -> f64 {
    itinerary.duration_secs as f64 / 60.0
        + TRANSFER_PENALTY_MINUTES * f64::from(transfer_count(itinerary))
        + WALKING_WEIGHT * walking_minutes(itinerary)
}

/// Picks the lowest-scoring itinerary; on a tie the provider's earlier suggestion wins.
pub fn select_best_transit(candidates: &[Itinerary]) -> Option<&Itinerary> {
    candidates
        .iter()
        .map(|itinerary| (transit_score(itinerary), itinerary))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, itinerary)| itinerary)
}

/// Resolves origin/destination pairs into [`RouteRecord`]s, going through the
/// cache first and the provider only on a miss.
pub struct RouteResolver<P> {
    provider: P,
    cache: RouteCache,
}

impl<P: RoutingProvider> RouteResolver<P> {
    pub fn new(provider: P, cache: RouteCache) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RouteCache {
        &mut self.cache
    }

    /// Cache-only lookup; never calls the provider.
    pub fn cached(
        &self,
        origin: &Address,
        destination: &Address,
        departure: Option<&NaiveDateTime>,
    ) -> Option<RouteRecord> {
        self.cache.get_route(origin, destination, departure)
    }

    /// Returns `Ok(None)` when the pair cannot be resolved: an address that does not
    /// geocode, a provider failure, or a mode with no itinerary. Only cache
    /// persistence failures are returned as errors.
    pub fn resolve(
        &mut self,
        origin: &Address,
        destination: &Address,
        departure: Option<&NaiveDateTime>,
    ) -> Result<Option<RouteRecord>, CacheError> {
        if let Some(record) = self.cached(origin, destination, departure) {
            log::debug!("[CACHE HIT] {} -> {}", origin, destination);
            return Ok(Some(record));
        }

        let Some(origin_coords) = self.locate(origin)? else {
            return Ok(None);
        };
        let Some(destination_coords) = self.locate(destination)? else {
            return Ok(None);
        };

        let record = match self.fetch_record(origin_coords, destination_coords, departure) {
            Ok(record) => record,
            Err(e) => {
                log::error!(
                    "Error getting route info for {} -> {}: {}",
                    origin,
                    destination,
                    e
                );
                return Ok(None);
            }
        };

        self.cache
            .set_route(origin, destination, departure, &record)?;
        Ok(Some(record))
    }

    /// Coordinates for an address: given directly, decoded from a Plus Code, or
    /// geocoded (with the geocode cache in front).
    fn locate(&mut self, address: &Address) -> Result<Option<Coord>, CacheError> {
        let text = match address {
            Address::Coords(coord) => return Ok(Some(*coord)),
            Address::Text(text) => text,
        };

        if address.is_plus_code() {
            return Ok(match self.provider.decode_plus_code(text) {
                Ok(Some(coord)) => Some(coord),
                Ok(None) => {
                    log::warn!("Plus Code {} did not resolve to a location", text);
                    None
                }
                Err(e) => {
                    log::error!("Error decoding Plus Code {}: {}", text, e);
                    None
                }
            });
        }

        if let Some(coord) = self.cache.get_geocode(address) {
            return Ok(Some(coord));
        }

        match self.provider.geocode(text) {
            Ok(Some(found)) => {
                self.cache.set_geocode(address, found.coords)?;
                Ok(Some(found.coords))
            }
            Ok(None) => {
                log::warn!("No geocode results for address: {}", text);
                Ok(None)
            }
            Err(e) => {
                log::error!("Error geocoding address {}: {}", text, e);
                Ok(None)
            }
        }
    }

    fn fetch_record(
        &self,
        origin: Coord,
        destination: Coord,
        departure: Option<&NaiveDateTime>,
    ) -> Result<RouteRecord, RoutingError> {
        let driving = self.itineraries(origin, destination, TravelMode::Driving, departure)?;
        let transit = self.itineraries(origin, destination, TravelMode::Transit, departure)?;
        let biking = self.itineraries(origin, destination, TravelMode::Bicycling, departure)?;

        let driving = &driving[0];
        let biking = &biking[0];
        let transit = select_best_transit(&transit).ok_or_else(|| {
            RoutingError::Generic("No transit itinerary to choose from".to_string())
        })?;

        Ok(RouteRecord {
            driving_distance: driving.distance_text.clone(),
            driving_duration: driving.duration_text.clone(),
            transit_distance: transit.distance_text.clone(),
            transit_duration: transit.duration_text.clone(),
            transit_steps: transfer_count(transit),
            biking_distance: biking.distance_text.clone(),
            biking_duration: biking.duration_text.clone(),
            origin_coords: origin,
            destination_coords: destination,
            origin_plus_code: self.plus_code(origin),
            destination_plus_code: self.plus_code(destination),
        })
    }

    /// Non-empty itinerary list for one mode, or an error if the provider has none.
    fn itineraries(
        &self,
        origin: Coord,
        destination: Coord,
        mode: TravelMode,
        departure: Option<&NaiveDateTime>,
    ) -> Result<Vec<Itinerary>, RoutingError> {
        let request = DirectionsRequest::new(origin, destination, mode, departure.copied());
        let itineraries = self.provider.get_directions(&request)?;
        if itineraries.is_empty() {
            return Err(RoutingError::NoItinerary {
                mode: mode.to_string(),
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }
        Ok(itineraries)
    }

    // Best effort: a missing Plus Code leaves the field empty.
    fn plus_code(&self, coord: Coord) -> Option<String> {
        match self.provider.reverse_geocode(coord) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("Error generating Plus Code for {}: {}", coord, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::cache::ROUTE_CACHE_FILE;
    use crate::sdk::routing::provider::StubProvider;
    use crate::sdk::routing::service::Step;
    use tempfile::tempdir;

    fn itinerary(minutes: u64, transfers: usize, walking_minutes: u64) -> Itinerary {
        let mut steps = vec![Step {
            mode: StepMode::Walking,
            duration_secs: walking_minutes * 60,
        }];
        steps.extend((0..transfers).map(|_| Step {
            mode: StepMode::Transit,
            duration_secs: 600,
        }));
        Itinerary {
            distance_text: format!("{} km", minutes / 2),
            duration_text: format!("{} mins", minutes),
            duration_secs: minutes * 60,
            steps,
        }
    }

    fn stub() -> StubProvider {
        StubProvider::new()
            .with_geocode("A", Coord::new(48.10, -1.60))
            .with_geocode("B", Coord::new(48.20, -1.70))
            .with_plus_code(Coord::new(48.10, -1.60), "8CXV4C2X+22")
            .with_directions(TravelMode::Driving, vec![itinerary(20, 0, 0)])
            .with_directions(
                TravelMode::Transit,
                vec![itinerary(30, 2, 20), itinerary(40, 1, 5)],
            )
            .with_directions(TravelMode::Bicycling, vec![itinerary(45, 0, 0)])
    }

    #[test]
    fn scoring_penalises_transfers_and_walking() {
        let a = itinerary(40, 1, 5);
        let b = itinerary(30, 2, 20);
        assert_eq!(transit_score(&a), 57.5);
        assert_eq!(transit_score(&b), 70.0);

        let candidates = vec![b, a.clone()];
        assert_eq!(select_best_transit(&candidates), Some(&a));
    }

    #[test]
    fn other_step_modes_are_ignored() {
        let mut plain = itinerary(10, 0, 0);
        plain.steps = vec![Step {
            mode: StepMode::Other,
            duration_secs: 300,
        }];
        assert_eq!(transfer_count(&plain), 0);
        assert_eq!(walking_minutes(&plain), 0.0);
        assert_eq!(transit_score(&plain), 10.0);
    }

    #[test]
    fn ties_keep_provider_order() {
        let first = itinerary(30, 1, 0);
        let mut second = itinerary(30, 1, 0);
        second.distance_text = "other".to_string();

        let candidates = vec![first.clone(), second];
        assert_eq!(select_best_transit(&candidates), Some(&first));
        assert_eq!(select_best_transit(&[]), None);
    }

    #[test]
    fn resolves_and_caches_record() {
        let dir = tempdir().unwrap();
        let provider = stub();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let record = resolver
            .resolve(&"A".into(), &"B".into(), None)
            .unwrap()
            .unwrap();

        assert_eq!(record.driving_duration, "20 mins");
        assert_eq!(record.transit_duration, "40 mins");
        assert_eq!(record.transit_steps, 1);
        assert_eq!(record.biking_distance, "22 km");
        assert_eq!(record.origin_plus_code.as_deref(), Some("8CXV4C2X+22"));
        assert_eq!(record.destination_plus_code, None);
        assert_eq!(resolver.cache().route_count(), 1);
        assert_eq!(resolver.cache().geocode_count(), 2);
    }

    #[test]
    fn second_resolution_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let provider = stub();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let first = resolver.resolve(&"A".into(), &"B".into(), None).unwrap();
        let calls = provider.call_count();
        assert!(calls > 0);

        let second = resolver.resolve(&"A".into(), &"B".into(), None).unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.call_count(), calls);
    }

    #[test]
    fn transit_request_asks_for_alternatives() {
        let dir = tempdir().unwrap();
        let provider = stub();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());
        resolver.resolve(&"A".into(), &"B".into(), None).unwrap();

        let requests = provider.directions_requests();
        assert_eq!(requests.len(), 3);
        let transit = requests
            .iter()
            .find(|r| r.mode == TravelMode::Transit)
            .unwrap();
        assert!(transit.transit.as_ref().unwrap().alternatives);
    }

    #[test]
    fn missing_mode_yields_nothing() {
        let dir = tempdir().unwrap();
        let provider = stub().with_directions(TravelMode::Bicycling, vec![]);
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let result = resolver.resolve(&"A".into(), &"B".into(), None).unwrap();
        assert_eq!(result, None);
        assert_eq!(resolver.cache().route_count(), 0);
    }

    #[test]
    fn unknown_address_yields_nothing() {
        let dir = tempdir().unwrap();
        let provider = stub();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let result = resolver.resolve(&"A".into(), &"Atlantis".into(), None).unwrap();
        assert_eq!(result, None);
        assert!(provider.directions_requests().is_empty());
    }

    #[test]
    fn provider_failure_yields_nothing() {
        let dir = tempdir().unwrap();
        let provider = stub().failing_directions();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let result = resolver.resolve(&"A".into(), &"B".into(), None).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn plus_code_failure_only_empties_plus_codes() {
        let dir = tempdir().unwrap();
        let provider = stub().failing_reverse_geocode();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let record = resolver
            .resolve(&"A".into(), &"B".into(), None)
            .unwrap()
            .unwrap();

        assert_eq!(record.origin_plus_code, None);
        assert_eq!(record.destination_plus_code, None);
        assert_eq!(record.transit_steps, 1);
        assert_eq!(
            resolver.cached(&"A".into(), &"B".into(), None),
            Some(record)
        );
    }

    #[test]
    fn cache_write_failure_propagates() {
        let dir = tempdir().unwrap();
        let provider = stub();
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());
        std::fs::create_dir(dir.path().join(ROUTE_CACHE_FILE)).unwrap();

        let err = resolver
            .resolve(&"A".into(), &"B".into(), None)
            .unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn plus_codes_and_coordinates_skip_geocoding() {
        let dir = tempdir().unwrap();
        let provider = stub().with_decoded_plus_code("8CXV4C2X+22", Coord::new(48.10, -1.60));
        let mut resolver = RouteResolver::new(&provider, RouteCache::open(dir.path()).unwrap());

        let origin = Address::from("8CXV4C2X+22");
        let destination = Address::from(Coord::new(48.20, -1.70));
        let record = resolver
            .resolve(&origin, &destination, None)
            .unwrap()
            .unwrap();

        assert_eq!(record.origin_coords, Coord::new(48.10, -1.60));
        assert_eq!(record.destination_coords, Coord::new(48.20, -1.70));
        assert_eq!(provider.geocode_calls(), 0);
        assert_eq!(resolver.cache().geocode_count(), 0);
    }
}
