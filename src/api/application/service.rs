use actix_web::{HttpResponse, ResponseError, error::BlockingError};
use chrono::Local;
use std::fmt;
use std::io::Read;
use tracing::{error, info, warn};
use validator::ValidationErrors;

use crate::api::validation::{describe, field_errors_json, ErrorResponse};
use crate::store::csv_store::read_rows_as;
use crate::store::{ApplicationRow, Column, CsvStore, RecordSet, StoreError};
use super::dto::{ImportError, ImportResponse};
use super::editor;
use super::models::{ApplicationDraft, ApplicationUpdate, ImportRow};

/// Service-level errors
#[derive(Debug)]
pub enum ServiceError {
    /// Writing the tracker file failed
    StorageError(StoreError),

    /// One or more fields failed validation
    ValidationError(ValidationErrors),

    /// Request could not be interpreted at all
    InvalidInput(String),

    /// No application matches the identifier
    NotFound(String),

    /// The blocking pool could not run the operation
    Interrupted,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::StorageError(e) => write!(f, "Storage error: {}", e),
            ServiceError::ValidationError(errors) => {
                write!(f, "Validation error: {}", describe(errors))
            }
            ServiceError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ServiceError::NotFound(identifier) => write!(f, "Application not found: {}", identifier),
            ServiceError::Interrupted => write!(f, "Operation was interrupted"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::StorageError(e) => Some(e),
            ServiceError::ValidationError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::StorageError(e)
    }
}

impl From<BlockingError> for ServiceError {
    fn from(_: BlockingError) -> Self {
        ServiceError::Interrupted
    }
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::StorageError(e) => {
                error!("Storage error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to save data".to_string(),
                    fields: serde_json::json!({"message": e.to_string()}),
                })
            }
            ServiceError::ValidationError(errors) => {
                warn!("Validation error: {}", describe(errors));
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: field_errors_json(errors),
                })
            }
            ServiceError::InvalidInput(msg) => {
                warn!("Invalid input: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Invalid input".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::NotFound(identifier) => {
                warn!("Application not found: {}", identifier);
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "Not found".to_string(),
                    fields: serde_json::json!({
                        "message": format!("No application matches '{}'", identifier)
                    }),
                })
            }
            ServiceError::Interrupted => {
                error!("Operation interrupted before it could run");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Operation interrupted".to_string(),
                    fields: serde_json::json!({"message": self.to_string()}),
                })
            }
        }
    }
}

/// A persisted snapshot together with what the operation produced
#[derive(Debug)]
pub struct Committed<T> {
    pub records: RecordSet,
    pub outcome: T,
}

/// Application service: validate, edit, persist.
///
/// Every mutating call takes the caller's current snapshot and, once the new
/// snapshot has been written to the store, hands it back. On any error the
/// caller's snapshot is still the last committed state.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    store: CsvStore,
}

impl ApplicationService {
    pub fn new(store: CsvStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CsvStore {
        &self.store
    }

    /// Read the full record set from the store
    pub fn load(&self) -> RecordSet {
        self.store.load()
    }

    fn commit<T>(&self, records: RecordSet, outcome: T) -> Result<Committed<T>, ServiceError> {
        self.store.save(&records)?;
        Ok(Committed { records, outcome })
    }

    /// Add a new application
    ///
    /// # Returns
    /// - `Ok(Committed<ApplicationRow>)` - the stored row, stamped with its submission date
    /// - `Err(ServiceError)` - validation or save failed
    pub fn add(
        &self,
        records: &RecordSet,
        draft: ApplicationDraft,
    ) -> Result<Committed<ApplicationRow>, ServiceError> {
        info!("Service: Adding application {} - {}", draft.job_title, draft.company);

        let (next, row) = editor::add(records, draft)?;
        let committed = self.commit(next, row)?;

        info!(
            "Service: Application added, {} entries in total",
            committed.records.len()
        );
        Ok(committed)
    }

    /// Modify the first application matching `identifier`
    ///
    /// # Returns
    /// - `Ok(Committed<(usize, ApplicationRow)>)` - index and new content of the modified row
    /// - `Err(ServiceError)` - not found, validation or save failed
    pub fn modify(
        &self,
        records: &RecordSet,
        identifier: &str,
        update: ApplicationUpdate,
    ) -> Result<Committed<(usize, ApplicationRow)>, ServiceError> {
        info!("Service: Modifying application {}", identifier);

        let index = editor::resolve_by_identifier(records, identifier)?;
        let next = editor::modify(records, index, update)?;
        let row = next
            .get(index)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(identifier.to_string()))?;
        let committed = self.commit(next, (index, row))?;

        info!("Service: Application at row {} modified", index);
        Ok(committed)
    }

    /// Delete every application whose `column` equals `value`.
    ///
    /// Nothing is written when no row matches.
    pub fn delete_where(
        &self,
        records: &RecordSet,
        column: Column,
        value: &str,
    ) -> Result<Committed<usize>, ServiceError> {
        info!("Service: Deleting rows where {} = '{}'", column, value);

        let (next, removed) = editor::delete_where(records, column, value);
        if removed == 0 {
            warn!("Service: No rows found with {} = '{}'", column, value);
            return Ok(Committed {
                records: next,
                outcome: 0,
            });
        }

        let committed = self.commit(next, removed)?;
        info!("Service: Deleted {} row(s)", removed);
        Ok(committed)
    }

    /// Append the rows of another tracker file
    ///
    /// # Business Logic
    /// - Validates each row like a new entry
    /// - Keeps each row's `Date_Submitted`, stamping rows without one
    /// - Saves once if any row was accepted
    /// - Returns a summary with the imported count and per-row errors
    pub fn import_csv<R: Read>(
        &self,
        records: &RecordSet,
        reader: R,
    ) -> Result<Committed<ImportResponse>, ServiceError> {
        let rows: Vec<ImportRow> = read_rows_as(reader)
            .map_err(|e| ServiceError::InvalidInput(format!("Unreadable CSV file: {}", e)))?;
        info!("Service: Importing {} rows", rows.len());

        let outcome = editor::import_at(records, rows, Local::now().naive_local());
        let errors: Vec<ImportError> = outcome
            .rejected
            .into_iter()
            .map(|(identifier, errors)| {
                warn!("Service: Skipping import row {}: {}", identifier, describe(&errors));
                ImportError {
                    identifier,
                    errors: errors
                        .field_errors()
                        .into_iter()
                        .flat_map(|(field, errs)| {
                            errs.iter().map(move |e| {
                                let message = e
                                    .message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| "Validation error".to_string());
                                format!("{}: {}", field, message)
                            })
                        })
                        .collect(),
                }
            })
            .collect();

        let response = ImportResponse {
            message: format!(
                "Import completed. {} imported, {} failed",
                outcome.imported,
                errors.len()
            ),
            imported: outcome.imported,
            errors,
        };

        if outcome.imported == 0 {
            warn!("Service: No valid rows to import");
            return Ok(Committed {
                records: outcome.records,
                outcome: response,
            });
        }

        self.commit(outcome.records, response)
    }
}
