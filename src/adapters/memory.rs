use crate::domain::ports::{DriverRow, PassengerRow, RecordSource, TripRow};
use crate::utils::error::Result;

/// Row sets held in memory, for tests and for hosts that already have the data.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub passengers: Vec<PassengerRow>,
    pub drivers: Vec<DriverRow>,
    pub trips: Vec<TripRow>,
}

impl InMemorySource {
    pub fn new(passengers: Vec<PassengerRow>, drivers: Vec<DriverRow>, trips: Vec<TripRow>) -> Self {
        Self {
            passengers,
            drivers,
            trips,
        }
    }
}

impl RecordSource for InMemorySource {
    fn passenger_rows(&self) -> Result<Vec<PassengerRow>> {
        Ok(self.passengers.clone())
    }

    fn driver_rows(&self) -> Result<Vec<DriverRow>> {
        Ok(self.drivers.clone())
    }

    fn trip_rows(&self) -> Result<Vec<TripRow>> {
        Ok(self.trips.clone())
    }

    fn describe(&self) -> String {
        "in-memory rows".to_string()
    }
}
