//! In-memory provider for exercising the resolver without network access.
//!
//! Answers come from canned tables; every call is recorded so tests can check
//! that cached lookups never reach the provider.

use crate::sdk::routing::address::Coord;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::service::{
    DirectionsRequest, GeocodeMatch, Itinerary, RoutingProvider, TravelMode,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Default)]
pub struct StubProvider {
    geocodes: HashMap<String, Coord>,
    plus_codes: Vec<(Coord, String)>,
    decoded: HashMap<String, Coord>,
    directions: Vec<(TravelMode, Vec<Itinerary>)>,
    fail_directions: bool,
    fail_reverse_geocode: bool,
    geocode_calls: Cell<usize>,
    other_calls: Cell<usize>,
    directions_requests: RefCell<Vec<DirectionsRequest>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geocode(mut self, address: &str, coord: Coord) -> Self {
        self.geocodes.insert(address.to_string(), coord);
        self
    }

    /// Plus Code returned by reverse geocoding `coord`.
    pub fn with_plus_code(mut self, coord: Coord, code: &str) -> Self {
        self.plus_codes.push((coord, code.to_string()));
        self
    }

    /// Coordinate returned when decoding `code`.
    pub fn with_decoded_plus_code(mut self, code: &str, coord: Coord) -> Self {
        self.decoded.insert(code.to_string(), coord);
        self
    }

    /// Itineraries for every request in `mode`; replaces any earlier set.
    pub fn with_directions(mut self, mode: TravelMode, itineraries: Vec<Itinerary>) -> Self {
        self.directions.retain(|(m, _)| *m != mode);
        self.directions.push((mode, itineraries));
        self
    }

    /// Makes every directions lookup fail as if the service were unreachable.
    pub fn failing_directions(mut self) -> Self {
        self.fail_directions = true;
        self
    }

    /// Makes every Plus Code lookup for a coordinate fail.
    pub fn failing_reverse_geocode(mut self) -> Self {
        self.fail_reverse_geocode = true;
        self
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.get()
    }

    /// Total number of calls made on any provider method.
    pub fn call_count(&self) -> usize {
        self.geocode_calls.get() + self.other_calls.get() + self.directions_requests.borrow().len()
    }

    pub fn directions_requests(&self) -> Vec<DirectionsRequest> {
        self.directions_requests.borrow().clone()
    }
}

impl RoutingProvider for StubProvider {
    fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>, RoutingError> {
        self.geocode_calls.set(self.geocode_calls.get() + 1);
        Ok(self.geocodes.get(address).map(|coords| GeocodeMatch {
            coords: *coords,
            plus_code: None,
        }))
    }

    fn reverse_geocode(&self, coord: Coord) -> Result<Option<String>, RoutingError> {
        self.other_calls.set(self.other_calls.get() + 1);
        if self.fail_reverse_geocode {
            return Err(RoutingError::ApiError {
                status: "UNKNOWN_ERROR".to_string(),
                message: "stubbed reverse geocode failure".to_string(),
            });
        }
        Ok(self
            .plus_codes
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, code)| code.clone()))
    }

    fn decode_plus_code(&self, code: &str) -> Result<Option<Coord>, RoutingError> {
        self.other_calls.set(self.other_calls.get() + 1);
        Ok(self.decoded.get(code).copied())
    }

    fn get_directions(&self, request: &DirectionsRequest) -> Result<Vec<Itinerary>, RoutingError> {
        self.directions_requests.borrow_mut().push(request.clone());
        if self.fail_directions {
            return Err(RoutingError::RawApiError(
                "stubbed service unavailable".to_string(),
            ));
        }
        Ok(self
            .directions
            .iter()
            .find(|(mode, _)| *mode == request.mode)
            .map(|(_, itineraries)| itineraries.clone())
            .unwrap_or_default())
    }
}
