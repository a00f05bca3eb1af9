use serde::Serialize;
use crate::store::{ApplicationRow, Column, RecordSet};

/// Current snapshot of the tracker
#[derive(Serialize)]
pub struct ApplicationsResponse {
    pub total: usize,
    pub applications: RecordSet,
}

/// Response for a newly added application
#[derive(Serialize)]
pub struct ApplicationResponse {
    pub message: String,
    pub application: ApplicationRow,
    pub total: usize,
}

/// Response for a modified application
#[derive(Serialize)]
pub struct ModifyResponse {
    pub message: String,
    pub index: usize,
    pub application: ApplicationRow,
}

/// Response for delete-where
#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub removed: usize,
    pub total: usize,
}

/// Identifiers offered by the modify form
#[derive(Serialize)]
pub struct IdentifiersResponse {
    pub identifiers: Vec<String>,
}

/// Distinct values offered by the delete form
#[derive(Serialize)]
pub struct ColumnValuesResponse {
    pub column: Column,
    pub values: Vec<String>,
}

/// Error details for a rejected import row
#[derive(Serialize, Debug)]
pub struct ImportError {
    pub identifier: String,
    pub errors: Vec<String>,
}

/// Response for CSV import
#[derive(Serialize, Debug)]
pub struct ImportResponse {
    pub message: String,
    pub imported: usize,
    pub errors: Vec<ImportError>,
}
