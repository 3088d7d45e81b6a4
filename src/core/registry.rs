use crate::core::dispatch::{self, Candidate, LastTrip};
use crate::domain::model::{
    parse_timestamp, Driver, DriverId, DriverStatus, Passenger, PassengerId, Timestamp, Trip, TripId,
};
use crate::domain::ports::{DriverRow, PassengerRow, RecordSource, TripRow};
use crate::utils::error::{DispatchError, Result};
use chrono::{Duration, Utc};
use std::collections::HashMap;

/// Flat fee taken off every trip before the driver's share.
pub const TRIP_FEE: f64 = 1.65;
/// Share of the remaining fare paid out to the driver.
pub const DRIVER_SHARE: f64 = 0.8;

const VIN_LENGTH: usize = 17;

/// A driver whose loaded status disagrees with their trip history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMismatch {
    pub driver_id: DriverId,
    pub status: DriverStatus,
    pub in_progress_trips: usize,
}

/// Owns every passenger, driver and trip.
///
/// Entities refer to each other by id; the registry resolves those ids. All
/// three collections keep source row order, with trips created by
/// [`Registry::request_trip`] appended at the end.
#[derive(Debug, Clone)]
pub struct Registry {
    passengers: Vec<Passenger>,
    drivers: Vec<Driver>,
    trips: Vec<Trip>,
    passenger_index: HashMap<PassengerId, usize>,
    driver_index: HashMap<DriverId, usize>,
    trip_index: HashMap<TripId, usize>,
    next_trip_id: TripId,
}

impl Registry {
    /// Builds and links the whole graph, or fails without yielding a registry.
    pub fn load<S: RecordSource + ?Sized>(source: &S) -> Result<Self> {
        tracing::info!("Loading records from {}", source.describe());

        let mut registry = Self {
            passengers: Vec::new(),
            drivers: Vec::new(),
            trips: Vec::new(),
            passenger_index: HashMap::new(),
            driver_index: HashMap::new(),
            trip_index: HashMap::new(),
            next_trip_id: 1,
        };

        registry.load_passengers(source.passenger_rows()?)?;
        registry.load_drivers(source.driver_rows()?)?;
        registry.load_trips(source.trip_rows()?)?;

        tracing::info!(
            "Loaded {} passengers, {} drivers, {} trips",
            registry.passengers.len(),
            registry.drivers.len(),
            registry.trips.len()
        );

        for mismatch in registry.status_mismatches() {
            tracing::warn!(
                "Driver {} is loaded as {} with {} in-progress trip(s)",
                mismatch.driver_id,
                mismatch.status,
                mismatch.in_progress_trips
            );
        }

        Ok(registry)
    }

    fn load_passengers(&mut self, rows: Vec<PassengerRow>) -> Result<()> {
        for row in rows {
            check_id("passenger", row.id)?;
            if self.passenger_index.contains_key(&row.id) {
                return Err(DispatchError::data_integrity(format!("duplicate passenger id {}", row.id)));
            }
            self.passenger_index.insert(row.id, self.passengers.len());
            self.passengers.push(Passenger::new(row.id, row.name, row.phone_num));
        }
        Ok(())
    }

    fn load_drivers(&mut self, rows: Vec<DriverRow>) -> Result<()> {
        for row in rows {
            check_id("driver", row.id)?;
            if self.driver_index.contains_key(&row.id) {
                return Err(DispatchError::data_integrity(format!("duplicate driver id {}", row.id)));
            }
            if let Some(vin) = &row.vin {
                if vin.chars().count() != VIN_LENGTH {
                    return Err(DispatchError::data_integrity(format!(
                        "driver {} has a {}-character VIN, expected {}",
                        row.id,
                        vin.chars().count(),
                        VIN_LENGTH
                    )));
                }
            }
            self.driver_index.insert(row.id, self.drivers.len());
            self.drivers.push(Driver::new(row.id, row.name, row.vin, row.status));
        }
        Ok(())
    }

    fn load_trips(&mut self, rows: Vec<TripRow>) -> Result<()> {
        for row in rows {
            let trip = build_trip(row)?;
            if self.trip_index.contains_key(&trip.id) {
                return Err(DispatchError::data_integrity(format!("duplicate trip id {}", trip.id)));
            }

            // 連結乘客與司機，找不到就整個載入失敗
            let passenger_slot = self.passenger_index.get(&trip.passenger_id).copied().ok_or_else(|| {
                DispatchError::data_integrity(format!(
                    "trip {} references unknown passenger {}",
                    trip.id, trip.passenger_id
                ))
            })?;
            let driver_slot = self.driver_index.get(&trip.driver_id).copied().ok_or_else(|| {
                DispatchError::data_integrity(format!(
                    "trip {} references unknown driver {}",
                    trip.id, trip.driver_id
                ))
            })?;

            tracing::debug!(
                "Linking trip {} to passenger {} and driver {}",
                trip.id,
                trip.passenger_id,
                trip.driver_id
            );

            let following_id = next_id_after(trip.id)?;

            self.passengers[passenger_slot].trips.push(trip.id);
            self.drivers[driver_slot].trips.push(trip.id);
            self.next_trip_id = self.next_trip_id.max(following_id);
            self.trip_index.insert(trip.id, self.trips.len());
            self.trips.push(trip);
        }
        Ok(())
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn find_passenger(&self, id: PassengerId) -> Result<&Passenger> {
        self.passenger_index
            .get(&id)
            .map(|&slot| &self.passengers[slot])
            .ok_or(DispatchError::NotFound {
                entity: "passenger",
                id,
            })
    }

    pub fn find_driver(&self, id: DriverId) -> Result<&Driver> {
        self.driver_index
            .get(&id)
            .map(|&slot| &self.drivers[slot])
            .ok_or(DispatchError::NotFound { entity: "driver", id })
    }

    pub fn find_trip(&self, id: TripId) -> Result<&Trip> {
        self.trip_index
            .get(&id)
            .map(|&slot| &self.trips[slot])
            .ok_or(DispatchError::NotFound { entity: "trip", id })
    }

    pub fn trip_passenger(&self, trip: &Trip) -> Result<&Passenger> {
        self.find_passenger(trip.passenger_id)
    }

    pub fn trip_driver(&self, trip: &Trip) -> Result<&Driver> {
        self.find_driver(trip.driver_id)
    }

    pub fn passenger_trips(&self, id: PassengerId) -> Result<Vec<&Trip>> {
        let passenger = self.find_passenger(id)?;
        Ok(self.resolve_trips(&passenger.trips))
    }

    pub fn driver_trips(&self, id: DriverId) -> Result<Vec<&Trip>> {
        let driver = self.find_driver(id)?;
        Ok(self.resolve_trips(&driver.trips))
    }

    fn resolve_trips(&self, ids: &[TripId]) -> Vec<&Trip> {
        ids.iter()
            .filter_map(|id| self.trip_index.get(id))
            .map(|&slot| &self.trips[slot])
            .collect()
    }

    /// Drivers with status AVAILABLE, in source order.
    pub fn find_available_drivers(&self) -> Vec<&Driver> {
        self.drivers.iter().filter(|driver| driver.is_available()).collect()
    }

    fn candidate(&self, driver: &Driver) -> Candidate {
        let last_trip = LastTrip::from_end_times(
            self.resolve_trips(&driver.trips).into_iter().map(|trip| trip.end_time),
        );
        Candidate::new(driver.id, last_trip)
    }

    /// Runs the dispatch policy over `candidates` using this registry's trip history.
    pub fn select_driver<'a>(&self, candidates: &[&'a Driver]) -> Result<&'a Driver> {
        let ranked: Vec<Candidate> = candidates.iter().map(|driver| self.candidate(driver)).collect();
        let chosen = dispatch::select_driver(&ranked)?;
        candidates
            .iter()
            .copied()
            .find(|driver| driver.id == chosen)
            .ok_or(DispatchError::NotFound {
                entity: "driver",
                id: chosen,
            })
    }

    /// Assigns a driver to a new trip for `passenger_id`, starting now.
    pub fn request_trip(&mut self, passenger_id: PassengerId) -> Result<&Trip> {
        self.request_trip_at(passenger_id, Utc::now().fixed_offset())
    }

    pub fn request_trip_at(&mut self, passenger_id: PassengerId, start_time: Timestamp) -> Result<&Trip> {
        let passenger_slot = self
            .passenger_index
            .get(&passenger_id)
            .copied()
            .ok_or(DispatchError::NotFound {
                entity: "passenger",
                id: passenger_id,
            })?;

        let candidates = self.find_available_drivers();
        if candidates.is_empty() {
            tracing::warn!("No available driver for passenger {}", passenger_id);
            return Err(DispatchError::NoDriverAvailable { passenger_id });
        }
        let driver_id = self.select_driver(&candidates)?.id;
        let driver_slot = self
            .driver_index
            .get(&driver_id)
            .copied()
            .ok_or(DispatchError::NotFound {
                entity: "driver",
                id: driver_id,
            })?;

        let following_id = next_id_after(self.next_trip_id)?;

        // 前置條件都通過後才開始修改狀態
        let trip = Trip::requested(self.next_trip_id, passenger_id, driver_id, start_time);
        self.next_trip_id = following_id;

        self.passengers[passenger_slot].trips.push(trip.id);
        let driver = &mut self.drivers[driver_slot];
        driver.trips.push(trip.id);
        driver.status = DriverStatus::Unavailable;

        tracing::info!(
            "Dispatched driver {} to passenger {} as trip {}",
            driver_id,
            passenger_id,
            trip.id
        );

        let slot = self.trips.len();
        self.trip_index.insert(trip.id, slot);
        self.trips.push(trip);
        Ok(&self.trips[slot])
    }

    /// Drivers whose loaded status contradicts their in-progress trips.
    pub fn status_mismatches(&self) -> Vec<StatusMismatch> {
        self.drivers
            .iter()
            .filter_map(|driver| {
                let in_progress_trips = self
                    .resolve_trips(&driver.trips)
                    .into_iter()
                    .filter(|trip| trip.is_in_progress())
                    .count();
                let consistent = match driver.status {
                    DriverStatus::Available => in_progress_trips == 0,
                    DriverStatus::Unavailable => in_progress_trips > 0,
                };
                (!consistent).then_some(StatusMismatch {
                    driver_id: driver.id,
                    status: driver.status,
                    in_progress_trips,
                })
            })
            .collect()
    }

    /// Total fare paid by a passenger over completed trips.
    pub fn net_expenditures(&self, passenger_id: PassengerId) -> Result<f64> {
        Ok(self
            .passenger_trips(passenger_id)?
            .into_iter()
            .filter(|trip| !trip.is_in_progress())
            .filter_map(|trip| trip.cost)
            .sum())
    }

    pub fn total_time_spent(&self, passenger_id: PassengerId) -> Result<Duration> {
        Ok(self
            .passenger_trips(passenger_id)?
            .into_iter()
            .filter_map(Trip::duration)
            .fold(Duration::zero(), |total, duration| total + duration))
    }

    /// Mean rating over completed trips, `0.0` when there are none.
    pub fn average_rating(&self, driver_id: DriverId) -> Result<f64> {
        let ratings: Vec<f64> = self
            .driver_trips(driver_id)?
            .into_iter()
            .filter(|trip| !trip.is_in_progress())
            .filter_map(|trip| trip.rating)
            .collect();
        if ratings.is_empty() {
            return Ok(0.0);
        }
        Ok(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }

    pub fn total_revenue(&self, driver_id: DriverId) -> Result<f64> {
        Ok(self
            .driver_trips(driver_id)?
            .into_iter()
            .filter(|trip| !trip.is_in_progress())
            .filter_map(|trip| trip.cost)
            .map(|cost| ((cost - TRIP_FEE) * DRIVER_SHARE).max(0.0))
            .sum())
    }
}

fn check_id(entity: &str, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(DispatchError::data_integrity(format!(
            "{} id must be positive, got {}",
            entity, id
        )));
    }
    Ok(())
}

fn next_id_after(id: TripId) -> Result<TripId> {
    id.checked_add(1)
        .ok_or_else(|| DispatchError::data_integrity("trip id space exhausted"))
}

fn build_trip(row: TripRow) -> Result<Trip> {
    check_id("trip", row.id)?;

    let start_time = parse_timestamp(&row.start_time)?;
    let end_time = row
        .end_time
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(parse_timestamp)
        .transpose()?;

    if let Some(end) = end_time {
        if end < start_time {
            return Err(DispatchError::data_integrity(format!(
                "trip {} ends before it starts",
                row.id
            )));
        }
    }
    if let Some(rating) = row.rating {
        if !rating.is_finite() || !(1.0..=5.0).contains(&rating) {
            return Err(DispatchError::data_integrity(format!(
                "trip {} has rating {} outside 1..=5",
                row.id, rating
            )));
        }
    }
    if let Some(cost) = row.cost {
        if !cost.is_finite() || cost < 0.0 {
            return Err(DispatchError::data_integrity(format!(
                "trip {} has invalid cost {}",
                row.id, cost
            )));
        }
    }

    Ok(Trip {
        id: row.id,
        passenger_id: row.passenger_id,
        driver_id: row.driver_id,
        start_time,
        end_time,
        cost: row.cost,
        rating: row.rating,
    })
}
