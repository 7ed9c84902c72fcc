use crate::sdk::routing::address::Coord;
use crate::sdk::routing::error::{ApiStatus, RoutingError};
use crate::sdk::routing::service::{Itinerary, Step, StepMode};
use serde::Deserialize;

// --- Data Structures for parsing Maps web service responses ---

#[derive(Deserialize)]
pub struct GeocodeResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}
#[derive(Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub plus_code: Option<PlusCode>,
}
#[derive(Deserialize)]
pub struct Geometry {
    pub location: Coord,
}
#[derive(Deserialize)]
pub struct PlusCode {
    pub global_code: String,
}

#[derive(Deserialize)]
pub struct DirectionsResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub routes: Vec<Route>,
}
#[derive(Deserialize)]
pub struct Route {
    pub legs: Vec<Leg>,
}
#[derive(Deserialize)]
pub struct Leg {
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub steps: Vec<LegStep>,
}
#[derive(Deserialize)]
pub struct LegStep {
    pub travel_mode: String,
    pub duration: TextValue,
}
#[derive(Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: f64,
}

/// `Ok(true)` when results follow, `Ok(false)` when the service found nothing.
pub fn has_results(status: ApiStatus) -> Result<bool, RoutingError> {
    match status.status.as_str() {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        _ => Err(RoutingError::from_status(status)),
    }
}

impl Route {
    /// Requests have no waypoints, so only the first leg matters.
    pub fn into_itinerary(self) -> Option<Itinerary> {
        let leg = self.legs.into_iter().next()?;
        Some(Itinerary {
            distance_text: leg.distance.text,
            duration_text: leg.duration.text,
            duration_secs: leg.duration.value.max(0.0) as u64,
            steps: leg.steps.into_iter().map(Step::from).collect(),
        })
    }
}

impl From<LegStep> for Step {
    fn from(step: LegStep) -> Self {
        let mode = match step.travel_mode.as_str() {
            "TRANSIT" => StepMode::Transit,
            "WALKING" => StepMode::Walking,
            _ => StepMode::Other,
        };
        Step {
            mode,
            duration_secs: step.duration.value.max(0.0) as u64,
        }
    }
}
