pub mod batch;
pub mod config;
pub mod links;
pub mod report;
pub mod routing;
pub mod util;
