//! Shareable Google Maps directions links for the report.

use crate::sdk::routing::{Address, TravelMode};
use reqwest::Url;

pub const MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/";

/// Directions link using the Maps URLs `api=1` scheme. Coordinates are rendered
/// as `lat,lng`; text (including Plus Codes) is passed through form-encoded.
pub fn maps_url(origin: &Address, destination: &Address, mode: TravelMode) -> String {
    let params = [
        ("api", "1".to_string()),
        ("origin", origin.to_string()),
        ("destination", destination.to_string()),
        ("travelmode", mode.to_string()),
    ];
    match Url::parse_with_params(MAPS_DIR_URL, &params) {
        Ok(url) => url.into(),
        Err(e) => {
            log::warn!(
                "Could not build maps link for {} -> {}: {}",
                origin,
                destination,
                e
            );
            String::new()
        }
    }
}
