pub mod remote;
pub mod stub;
pub mod types;

pub use remote::GoogleMapsProvider;
pub use stub::StubProvider;
