pub mod csv_store;
pub mod models;

pub use csv_store::{CsvStore, StoreError};
pub use models::{ApplicationRow, ApplicationStatus, Column, RecordSet};
