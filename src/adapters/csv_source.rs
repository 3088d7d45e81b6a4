use crate::domain::ports::{DriverRow, PassengerRow, RecordSource, TripRow};
use crate::utils::error::{DispatchError, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const PASSENGERS_FILE: &str = "passengers.csv";
pub const DRIVERS_FILE: &str = "drivers.csv";
pub const TRIPS_FILE: &str = "trips.csv";

/// Reads the three CSV files (with header rows) from one directory.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    directory: PathBuf,
    passengers_file: String,
    drivers_file: String,
    trips_file: String,
}

impl CsvDirectorySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            passengers_file: PASSENGERS_FILE.to_string(),
            drivers_file: DRIVERS_FILE.to_string(),
            trips_file: TRIPS_FILE.to_string(),
        }
    }

    pub fn with_file_names(
        mut self,
        passengers_file: impl Into<String>,
        drivers_file: impl Into<String>,
        trips_file: impl Into<String>,
    ) -> Self {
        self.passengers_file = passengers_file.into();
        self.drivers_file = drivers_file.into();
        self.trips_file = trips_file.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn read_rows<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.directory.join(file_name);
        tracing::debug!("Reading {}", path.display());

        let file = File::open(&path)?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let headers = reader.headers()?;
        tracing::debug!("{} columns: {:?}", file_name, headers);

        let mut rows = Vec::new();
        for (index, result) in reader.deserialize::<T>().enumerate() {
            // 第 1 行是標題，資料從第 2 行開始
            let row = result.map_err(|e| {
                DispatchError::data_integrity(format!("{} line {}: {}", file_name, index + 2, e))
            })?;
            rows.push(row);
        }

        tracing::debug!("Read {} rows from {}", rows.len(), file_name);
        Ok(rows)
    }
}

impl RecordSource for CsvDirectorySource {
    fn passenger_rows(&self) -> Result<Vec<PassengerRow>> {
        self.read_rows(&self.passengers_file)
    }

    fn driver_rows(&self) -> Result<Vec<DriverRow>> {
        self.read_rows(&self.drivers_file)
    }

    fn trip_rows(&self) -> Result<Vec<TripRow>> {
        self.read_rows(&self.trips_file)
    }

    fn describe(&self) -> String {
        self.directory.display().to_string()
    }
}
