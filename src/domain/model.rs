use crate::utils::error::{DispatchError, Result};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

pub type PassengerId = i64;
pub type DriverId = i64;
pub type TripId = i64;

/// Trip timestamps keep the offset they were recorded with.
pub type Timestamp = DateTime<FixedOffset>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// 解析 `2018-05-25 11:52:40 -0700` 或 RFC 3339 格式的時間
pub fn parse_timestamp(value: &str) -> Result<Timestamp> {
    let trimmed = value.trim();
    DateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .map_err(|e| DispatchError::data_integrity(format!("unparsable timestamp '{}': {}", value, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Available,
    Unavailable,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Available => "AVAILABLE",
            DriverStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    pub id: PassengerId,
    pub name: String,
    pub phone_number: Option<String>,
    /// Trips ridden by this passenger, in the order they were linked.
    pub trips: Vec<TripId>,
}

impl Passenger {
    pub fn new(id: PassengerId, name: impl Into<String>, phone_number: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone_number,
            trips: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub vin: Option<String>,
    pub status: DriverStatus,
    /// Trips driven, in the order they were linked.
    pub trips: Vec<TripId>,
}

impl Driver {
    pub fn new(id: DriverId, name: impl Into<String>, vin: Option<String>, status: DriverStatus) -> Self {
        Self {
            id,
            name: name.into(),
            vin,
            status,
            trips: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == DriverStatus::Available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: TripId,
    pub passenger_id: PassengerId,
    pub driver_id: DriverId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub cost: Option<f64>,
    pub rating: Option<f64>,
}

impl Trip {
    /// A freshly requested trip: no end time, cost or rating yet.
    pub fn requested(id: TripId, passenger_id: PassengerId, driver_id: DriverId, start_time: Timestamp) -> Self {
        Self {
            id,
            passenger_id,
            driver_id,
            start_time,
            end_time: None,
            cost: None,
            rating: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
