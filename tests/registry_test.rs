use anyhow::Result;
use chrono::Utc;
use ride_dispatch::{
    CsvDirectorySource, DispatchError, DriverRow, DriverStatus, InMemorySource, PassengerRow, Registry,
    TripRow,
};
use std::path::PathBuf;

fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test_data")
}

fn build_test_registry() -> Registry {
    Registry::load(&CsvDirectorySource::new(test_data_dir())).expect("test data should load")
}

#[test]
fn test_loads_passengers_in_source_order() {
    let registry = build_test_registry();

    let first = registry.passengers().first().unwrap();
    let last = registry.passengers().last().unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.name, "Passenger 1");
    assert_eq!(last.id, 8);
    assert_eq!(last.name, "Passenger 8");
}

#[test]
fn test_loads_drivers_in_source_order() {
    let registry = build_test_registry();

    let first = registry.drivers().first().unwrap();
    let last = registry.drivers().last().unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.name, "Driver 1 (unavailable)");
    assert_eq!(first.status, DriverStatus::Unavailable);
    assert_eq!(last.id, 3);
    assert_eq!(last.name, "Driver 3 (no trips)");
    assert_eq!(last.status, DriverStatus::Available);
    assert!(last.trips.is_empty());
}

#[test]
fn test_trips_link_to_passengers_and_drivers() -> Result<()> {
    let registry = build_test_registry();
    assert_eq!(registry.trips().len(), 5);

    for trip in registry.trips() {
        let passenger = registry.trip_passenger(trip)?;
        assert_eq!(passenger.id, trip.passenger_id);
        assert!(registry.passenger_trips(passenger.id)?.contains(&trip));

        let driver = registry.trip_driver(trip)?;
        assert_eq!(driver.id, trip.driver_id);
        assert!(registry.driver_trips(driver.id)?.contains(&trip));
    }
    Ok(())
}

#[test]
fn test_find_passenger_and_driver() -> Result<()> {
    let registry = build_test_registry();

    assert_eq!(registry.find_passenger(2)?.id, 2);
    assert_eq!(registry.find_driver(2)?.id, 2);

    for bad_id in [0, -3, 9] {
        assert!(matches!(
            registry.find_passenger(bad_id),
            Err(DispatchError::NotFound { .. })
        ));
    }
    for bad_id in [0, 4] {
        assert!(matches!(
            registry.find_driver(bad_id),
            Err(DispatchError::NotFound { .. })
        ));
    }
    Ok(())
}

#[test]
fn test_find_available_drivers_matches_status_filter() {
    let registry = build_test_registry();

    let available = registry.find_available_drivers();
    let expected: Vec<_> = registry
        .drivers()
        .iter()
        .filter(|d| d.status == DriverStatus::Available)
        .collect();

    assert_eq!(available, expected);
    assert_eq!(available.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_select_driver_prefers_driver_without_trips() -> Result<()> {
    let registry = build_test_registry();
    let available = registry.find_available_drivers();

    let selected = registry.select_driver(&available)?;
    assert_eq!(selected.id, 3);
    assert!(selected.trips.is_empty());
    Ok(())
}

#[test]
fn test_select_driver_empty_candidates() {
    let registry = build_test_registry();
    assert!(matches!(
        registry.select_driver(&[]),
        Err(DispatchError::InvalidArgument { .. })
    ));
}

#[test]
fn test_request_trip_prefers_new_driver() -> Result<()> {
    let mut registry = build_test_registry();
    let before = registry.find_driver(3)?.status;

    let trip = registry.request_trip(1)?.clone();

    assert_eq!(trip.driver_id, 3);
    assert_eq!(before, DriverStatus::Available);
    assert_eq!(registry.trip_driver(&trip)?.status, DriverStatus::Unavailable);
    Ok(())
}

#[test]
fn test_request_trip_fields() -> Result<()> {
    let mut registry = build_test_registry();

    let trip = registry.request_trip(2)?.clone();

    assert_eq!(trip.id, 6);
    assert_eq!(trip.passenger_id, 2);
    assert_eq!(trip.end_time, None);
    assert_eq!(trip.cost, None);
    assert_eq!(trip.rating, None);

    let drift = Utc::now().signed_duration_since(trip.start_time);
    assert!(drift.num_seconds().abs() < 5);
    Ok(())
}

#[test]
fn test_request_trip_appends_to_every_collection() -> Result<()> {
    let mut registry = build_test_registry();
    let trips_before = registry.trips().len();
    let passenger_before = registry.find_passenger(1)?.trips.len();
    let driver_before = registry.find_driver(3)?.trips.len();

    let trip = registry.request_trip(1)?.clone();

    assert_eq!(registry.trips().len(), trips_before + 1);
    assert_eq!(registry.find_passenger(1)?.trips.len(), passenger_before + 1);
    assert_eq!(registry.find_driver(3)?.trips.len(), driver_before + 1);
    assert_eq!(registry.trips().last(), Some(&trip));
    assert_eq!(registry.find_trip(trip.id)?, &trip);
    Ok(())
}

#[test]
fn test_request_trip_falls_back_to_longest_idle_driver() -> Result<()> {
    let mut registry = build_test_registry();

    assert_eq!(registry.request_trip(1)?.driver_id, 3);
    assert_eq!(registry.request_trip(2)?.driver_id, 2);
    Ok(())
}

#[test]
fn test_request_trip_without_available_driver() -> Result<()> {
    let mut registry = build_test_registry();
    registry.request_trip(1)?;
    registry.request_trip(2)?;

    let trips_before = registry.trips().to_vec();
    let passengers_before = registry.passengers().to_vec();
    let drivers_before = registry.drivers().to_vec();

    let err = registry.request_trip(3).unwrap_err();
    assert!(matches!(err, DispatchError::NoDriverAvailable { passenger_id: 3 }));

    assert_eq!(registry.trips(), trips_before.as_slice());
    assert_eq!(registry.passengers(), passengers_before.as_slice());
    assert_eq!(registry.drivers(), drivers_before.as_slice());
    assert!(registry.find_available_drivers().is_empty());
    Ok(())
}

#[test]
fn test_request_trip_unknown_passenger() {
    let mut registry = build_test_registry();
    assert!(matches!(
        registry.request_trip(0),
        Err(DispatchError::NotFound { entity: "passenger", id: 0 })
    ));
    assert_eq!(registry.find_available_drivers().len(), 2);
}

/// 所有可用司機都跑過車時，選最後一趟最早結束的司機
#[test]
fn test_select_driver_earliest_finished_trip() -> Result<()> {
    let trip = |id, driver_id, end: &str| TripRow {
        id,
        driver_id,
        passenger_id: 1,
        start_time: "2018-06-10 11:00:00 -0700".to_string(),
        end_time: Some(end.to_string()),
        cost: Some(5.0),
        rating: Some(1.0),
    };
    let driver = |id, status| DriverRow {
        id,
        name: format!("Driver {}", id),
        vin: None,
        status,
    };

    let source = InMemorySource::new(
        vec![PassengerRow {
            id: 1,
            name: "Passenger 1".to_string(),
            phone_num: None,
        }],
        vec![
            driver(1, DriverStatus::Unavailable),
            driver(2, DriverStatus::Available),
            driver(3, DriverStatus::Available),
        ],
        vec![
            trip(1, 1, "2018-06-10 11:05:00 -0700"),
            trip(2, 2, "2018-06-10 11:30:00 -0700"),
            trip(3, 2, "2018-06-10 12:30:00 -0700"),
            trip(4, 3, "2018-06-10 12:10:00 -0700"),
        ],
    );

    let registry = Registry::load(&source)?;
    let available = registry.find_available_drivers();
    let selected = registry.select_driver(&available)?;

    assert_eq!(selected.id, 3);
    let last_end = registry.driver_trips(selected.id)?[0].end_time;
    assert_eq!(
        last_end,
        Some(ride_dispatch::domain::model::parse_timestamp("2018-06-10 12:10:00 -0700")?)
    );
    Ok(())
}

#[test]
fn test_load_fails_on_unknown_passenger() {
    let dir = tempfile::TempDir::new().unwrap();
    for file in ["passengers.csv", "drivers.csv"] {
        std::fs::copy(test_data_dir().join(file), dir.path().join(file)).unwrap();
    }
    std::fs::write(
        dir.path().join("trips.csv"),
        "id,driver_id,passenger_id,start_time,end_time,cost,rating\n\
         1,2,99,2018-05-25 11:52:40 -0700,2018-05-25 12:25:00 -0700,10,5\n",
    )
    .unwrap();

    let err = Registry::load(&CsvDirectorySource::new(dir.path())).unwrap_err();
    assert!(matches!(err, DispatchError::DataIntegrity { .. }));
    assert!(err.to_string().contains("unknown passenger 99"));
}

#[test]
fn test_load_fails_on_malformed_row() {
    let dir = tempfile::TempDir::new().unwrap();
    for file in ["passengers.csv", "drivers.csv"] {
        std::fs::copy(test_data_dir().join(file), dir.path().join(file)).unwrap();
    }
    std::fs::write(
        dir.path().join("trips.csv"),
        "id,driver_id,passenger_id,start_time,end_time,cost,rating\n\
         1,2,1,,2018-05-25 12:25:00 -0700,10,5\n",
    )
    .unwrap();

    let err = Registry::load(&CsvDirectorySource::new(dir.path())).unwrap_err();
    assert!(matches!(err, DispatchError::DataIntegrity { .. }));
}

#[test]
fn test_loaded_statuses_are_consistent() {
    let registry = build_test_registry();
    assert!(registry.status_mismatches().is_empty());
}
