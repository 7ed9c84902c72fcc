use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in degrees.
#[derive(Serialize, Deserialize, PartialEq, Clone, Copy, Debug)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A location as written in the pair config: either free text (which may be a
/// Plus Code) or explicit coordinates.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(untagged)]
pub enum Address {
    Coords(Coord),
    Text(String),
}

impl Address {
    /// Plus Codes are recognised by the `+` separator, e.g. `8FW4V75V+8Q`.
    pub fn is_plus_code(&self) -> bool {
        matches!(self, Address::Text(text) if text.contains('+'))
    }
}

impl From<&str> for Address {
    fn from(text: &str) -> Self {
        Address::Text(text.to_string())
    }
}

impl From<Coord> for Address {
    fn from(coord: Coord) -> Self {
        Address::Coords(coord)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Coords(coord) => coord.fmt(f),
            Address::Text(text) => f.write_str(text),
        }
    }
}

/// Stable textual form of a float for cache keys.
///
/// Shortest round-trip decimal, with a trailing `.0` on integral values so
/// `48` and `48.0` never produce different keys across runs. Small magnitudes
/// stay positional (`0.00005`, not `5e-05`).
pub fn canonical_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

pub fn address_key(address: &Address) -> String {
    match address {
        Address::Coords(coord) => format!(
            "coord_{}_{}",
            canonical_float(coord.lat),
            canonical_float(coord.lng)
        ),
        Address::Text(text) => format!("addr_{}", text),
    }
}

/// Minute-granularity departure key. No timezone handling: the datetime is used as given.
pub fn time_key(departure: Option<&NaiveDateTime>) -> String {
    match departure {
        Some(at) => at.format("%Y-%m-%d_%H:%M").to_string(),
        None => "no_time".to_string(),
    }
}

pub fn route_key(
    origin: &Address,
    destination: &Address,
    departure: Option<&NaiveDateTime>,
) -> String {
    format!(
        "{}_{}_{}",
        address_key(origin),
        address_key(destination),
        time_key(departure)
    )
}
