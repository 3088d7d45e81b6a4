// Adapters layer: concrete record sources.

pub mod csv_source;
pub mod memory;

pub use csv_source::CsvDirectorySource;
pub use memory::InMemorySource;
