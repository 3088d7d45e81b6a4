use crate::domain::model::{DriverId, Timestamp};
use crate::utils::error::{DispatchError, Result};

/// Where a driver stands relative to their most recent trip.
///
/// Variant order is the dispatch preference: drivers who never drove come
/// first, then drivers ordered by when their latest trip ended, and drivers
/// still on a trip come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LastTrip {
    Never,
    Ended(Timestamp),
    InProgress,
}

impl LastTrip {
    /// Folds a driver's trip end times (`None` = in progress) into their standing.
    pub fn from_end_times<I>(end_times: I) -> Self
    where
        I: IntoIterator<Item = Option<Timestamp>>,
    {
        end_times
            .into_iter()
            .fold(LastTrip::Never, |acc, end| match (acc, end) {
                (LastTrip::InProgress, _) | (_, None) => LastTrip::InProgress,
                (LastTrip::Never, Some(end)) => LastTrip::Ended(end),
                (LastTrip::Ended(latest), Some(end)) => LastTrip::Ended(latest.max(end)),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub driver_id: DriverId,
    pub last_trip: LastTrip,
}

impl Candidate {
    pub fn new(driver_id: DriverId, last_trip: LastTrip) -> Self {
        Self {
            driver_id,
            last_trip,
        }
    }
}

/// Picks the driver who should take the next trip.
///
/// 1. A driver with no trips at all wins outright.
/// 2. Otherwise the driver whose latest trip ended earliest wins.
///
/// Ties go to whoever comes first in `candidates`.
pub fn select_driver(candidates: &[Candidate]) -> Result<DriverId> {
    // min_by_key 在相同值時回傳第一個
    candidates
        .iter()
        .min_by_key(|candidate| candidate.last_trip)
        .map(|candidate| candidate.driver_id)
        .ok_or_else(|| DispatchError::invalid_argument("select_driver requires at least one candidate"))
}
