pub mod address;
pub mod cache;
pub mod error;
pub mod provider;
pub mod route;
pub mod service;

pub use address::{address_key, route_key, Address, Coord};
pub use cache::RouteCache;
pub use error::{CacheError, RoutingError};
pub use provider::{GoogleMapsProvider, StubProvider};
pub use route::{select_best_transit, transit_score, RouteRecord, RouteResolver};
pub use service::{DirectionsRequest, Itinerary, RoutingProvider, TravelMode};
