use super::types::{has_results, DirectionsResponse, GeocodeResponse, Route};
use crate::sdk::routing::address::Coord;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::service::{DirectionsRequest, GeocodeMatch, Itinerary, RoutingProvider};
use crate::sdk::util::rate_limit::{wait, Limiter};
use chrono::{Local, NaiveDateTime, TimeZone};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Google Maps Geocoding and Directions web services.
pub struct GoogleMapsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: Limiter,
}

impl GoogleMapsProvider {
    pub fn new(api_key: String, limiter: Limiter) -> Result<Self, RoutingError> {
        Self::with_base_url(api_key, limiter, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        limiter: Limiter,
        base_url: String,
    ) -> Result<Self, RoutingError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(15)).build()?,
            api_key,
            base_url,
            limiter,
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RoutingError> {
        wait(&self.limiter);
        let url = format!("{}/{}", self.base_url, path);

        let response = match self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", &self.api_key)])
            .send()
        {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Failed to send GET request. URL: {}\nError: {}", url, e);
                return Err(RoutingError::RequestError(e));
            }
        };

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            log::error!(
                "API returned non-success status: {}. Unparseable Body: {}",
                status,
                text
            );
            return Err(RoutingError::RawApiError(text));
        }

        serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "Failed to parse response. URL: {}\nError: {}. Body: {}",
                url,
                e,
                text
            );
            RoutingError::ParseError(e)
        })
    }

    fn geocode_query(
        &self,
        query: &[(&str, String)],
    ) -> Result<Option<GeocodeMatch>, RoutingError> {
        let response: GeocodeResponse = self.get_json("geocode/json", query)?;
        if !has_results(response.status)? {
            return Ok(None);
        }
        Ok(response.results.into_iter().next().map(|result| GeocodeMatch {
            coords: result.geometry.location,
            plus_code: result.plus_code.map(|p| p.global_code),
        }))
    }
}

/// Unix seconds for a departure, reading the naive datetime as local time.
pub fn departure_timestamp(departure: &NaiveDateTime) -> i64 {
    match Local.from_local_datetime(departure).earliest() {
        Some(local) => local.timestamp(),
        // Skipped by a DST jump; the instant as UTC is close enough.
        None => departure.and_utc().timestamp(),
    }
}

pub fn directions_query(request: &DirectionsRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("origin", request.origin.to_string()),
        ("destination", request.destination.to_string()),
        ("mode", request.mode.to_string()),
    ];
    if let Some(departure) = &request.departure {
        query.push(("departure_time", departure_timestamp(departure).to_string()));
    }
    if let Some(transit) = &request.transit {
        query.push(("alternatives", transit.alternatives.to_string()));
        let modes: Vec<&str> = transit.modes.iter().map(|m| m.as_str()).collect();
        query.push(("transit_mode", modes.join("|")));
        query.push((
            "transit_routing_preference",
            transit.preference.as_str().to_string(),
        ));
    }
    query
}

impl RoutingProvider for GoogleMapsProvider {
    fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>, RoutingError> {
        log::debug!("[PROVIDER] Calling geocode for address: \"{}\"", address);
        self.geocode_query(&[("address", address.to_string())])
    }

    fn reverse_geocode(&self, coord: Coord) -> Result<Option<String>, RoutingError> {
        log::debug!("[PROVIDER] Calling reverse_geocode for coord: {}", coord);
        Ok(self
            .geocode_query(&[("latlng", coord.to_string())])?
            .and_then(|found| found.plus_code))
    }

    fn decode_plus_code(&self, code: &str) -> Result<Option<Coord>, RoutingError> {
        log::debug!("[PROVIDER] Decoding Plus Code: \"{}\"", code);
        Ok(self
            .geocode_query(&[("address", code.to_string())])?
            .map(|found| found.coords))
    }

    fn get_directions(&self, request: &DirectionsRequest) -> Result<Vec<Itinerary>, RoutingError> {
        log::debug!(
            "[PROVIDER] Calling get_directions ({}) for {} -> {}",
            request.mode,
            request.origin,
            request.destination
        );
        let response: DirectionsResponse =
            self.get_json("directions/json", &directions_query(request))?;
        if !has_results(response.status)? {
            return Ok(Vec::new());
        }
        Ok(response
            .routes
            .into_iter()
            .filter_map(Route::into_itinerary)
            .collect())
    }
}
