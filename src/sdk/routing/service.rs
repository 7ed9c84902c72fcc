use super::address::Coord;
use super::error::RoutingError;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Transit,
    Bicycling,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle types a transit itinerary may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitMode {
    Bus,
    Subway,
    Train,
    Tram,
    Rail,
}

impl TransitMode {
    pub const ALL: [TransitMode; 5] = [
        TransitMode::Bus,
        TransitMode::Subway,
        TransitMode::Train,
        TransitMode::Tram,
        TransitMode::Rail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitMode::Bus => "bus",
            TransitMode::Subway => "subway",
            TransitMode::Train => "train",
            TransitMode::Tram => "tram",
            TransitMode::Rail => "rail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitRoutingPreference {
    FewerTransfers,
}

impl TransitRoutingPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitRoutingPreference::FewerTransfers => "fewer_transfers",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitOptions {
    pub alternatives: bool,
    pub modes: Vec<TransitMode>,
    pub preference: TransitRoutingPreference,
}

impl Default for TransitOptions {
    fn default() -> Self {
        Self {
            alternatives: true,
            modes: TransitMode::ALL.to_vec(),
            preference: TransitRoutingPreference::FewerTransfers,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Coord,
    pub destination: Coord,
    pub mode: TravelMode,
    pub departure: Option<NaiveDateTime>,
    /// Only set for `TravelMode::Transit`.
    pub transit: Option<TransitOptions>,
}

impl DirectionsRequest {
    pub fn new(
        origin: Coord,
        destination: Coord,
        mode: TravelMode,
        departure: Option<NaiveDateTime>,
    ) -> Self {
        let transit = (mode == TravelMode::Transit).then(TransitOptions::default);
        Self {
            origin,
            destination,
            mode,
            departure,
            transit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Transit,
    Walking,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub mode: StepMode,
    pub duration_secs: u64,
}

/// One candidate route between two points, reduced to its single leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub distance_text: String,
    pub duration_text: String,
    pub duration_secs: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coords: Coord,
    pub plus_code: Option<String>,
}

/// The mapping service the resolver talks to. `Ok(None)` / an empty list means
/// the service answered but found nothing.
pub trait RoutingProvider {
    /// Geocodes a free-text address.
    fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>, RoutingError>;

    /// Looks up the global Plus Code for a coordinate.
    fn reverse_geocode(&self, coord: Coord) -> Result<Option<String>, RoutingError>;

    /// Resolves a Plus Code to the coordinate it designates.
    fn decode_plus_code(&self, code: &str) -> Result<Option<Coord>, RoutingError>;

    /// Gets every itinerary the service offers for the request, in the service's order.
    fn get_directions(&self, request: &DirectionsRequest) -> Result<Vec<Itinerary>, RoutingError>;
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for &P {
    fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>, RoutingError> {
        (**self).geocode(address)
    }

    fn reverse_geocode(&self, coord: Coord) -> Result<Option<String>, RoutingError> {
        (**self).reverse_geocode(coord)
    }

    fn decode_plus_code(&self, code: &str) -> Result<Option<Coord>, RoutingError> {
        (**self).decode_plus_code(code)
    }

    fn get_directions(&self, request: &DirectionsRequest) -> Result<Vec<Itinerary>, RoutingError> {
        (**self).get_directions(request)
    }
}
