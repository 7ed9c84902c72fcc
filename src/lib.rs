pub mod sdk;

pub use sdk::batch::{run_batch, BatchOptions, PairsConfig};
pub use sdk::config::AppConfig;
pub use sdk::report::{write_report, ReportRow};
pub use sdk::routing::{Address, Coord, RouteCache, RouteRecord, RouteResolver};
