use crate::domain::model::{DriverId, DriverStatus, PassengerId, TripId};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRow {
    pub id: PassengerId,
    pub name: String,
    #[serde(default, alias = "phone_number")]
    pub phone_num: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRow {
    pub id: DriverId,
    pub name: String,
    #[serde(default)]
    pub vin: Option<String>,
    pub status: DriverStatus,
}

/// Timestamps stay raw here; the registry parses them while linking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRow {
    pub id: TripId,
    pub driver_id: DriverId,
    pub passenger_id: PassengerId,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Supplies the three row sets the registry is built from.
pub trait RecordSource {
    fn passenger_rows(&self) -> Result<Vec<PassengerRow>>;
    fn driver_rows(&self) -> Result<Vec<DriverRow>>;
    fn trip_rows(&self) -> Result<Vec<TripRow>>;

    /// Human readable origin, used in log lines.
    fn describe(&self) -> String;
}
