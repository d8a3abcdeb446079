//! garden-host: records timestamped garden sensor measurements in memory and
//! answers min / max / average queries over them.

pub mod api;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod seed;
pub mod stats;
pub mod store;
pub mod timestamp;

pub use api::{create_router, AppState};
pub use domain::Measurement;
pub use error::MeasurementError;
pub use store::MeasurementStore;
