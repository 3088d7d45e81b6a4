pub mod dispatch;
pub mod registry;

pub use crate::domain::model::{Driver, DriverStatus, Passenger, Trip};
pub use crate::domain::ports::RecordSource;
pub use crate::utils::error::Result;
