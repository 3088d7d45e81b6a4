pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::adapters::{CsvDirectorySource, InMemorySource};
pub use crate::config::DispatchConfig;
pub use crate::core::{
    dispatch::{select_driver, Candidate, LastTrip},
    registry::{Registry, StatusMismatch},
};
pub use crate::domain::model::{Driver, DriverStatus, Passenger, Timestamp, Trip};
pub use crate::domain::ports::{DriverRow, PassengerRow, RecordSource, TripRow};
pub use crate::utils::error::{DispatchError, Result};
