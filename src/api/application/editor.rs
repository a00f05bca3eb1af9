//! Pure edits over a record set.
//!
//! Every operation borrows the current snapshot and returns a new one, so a
//! rejected edit leaves the caller's snapshot exactly as it was.

use chrono::{Local, NaiveDateTime};
use tracing::debug;
use validator::ValidationErrors;

use super::models::{ApplicationDraft, ApplicationUpdate, ImportRow};
use super::service::ServiceError;
use crate::store::models::DATE_FORMAT;
use crate::store::{ApplicationRow, Column, RecordSet};

/// Validate `draft`, stamp it with the current local time and append it
pub fn add(
    records: &RecordSet,
    draft: ApplicationDraft,
) -> Result<(RecordSet, ApplicationRow), ServiceError> {
    add_at(records, draft, Local::now().naive_local())
}

pub fn add_at(
    records: &RecordSet,
    draft: ApplicationDraft,
    now: NaiveDateTime,
) -> Result<(RecordSet, ApplicationRow), ServiceError> {
    let row = draft
        .into_row(now.format(DATE_FORMAT).to_string())
        .map_err(ServiceError::ValidationError)?;

    let mut next = records.clone();
    next.push(row.clone());
    Ok((next, row))
}

/// Index of the first row whose `job_title - company` equals `identifier`.
///
/// Identifiers are not unique; later rows sharing one are never returned.
pub fn resolve_by_identifier(records: &RecordSet, identifier: &str) -> Result<usize, ServiceError> {
    records
        .iter()
        .position(|row| row.identifier() == identifier)
        .ok_or_else(|| ServiceError::NotFound(identifier.to_string()))
}

/// Apply `update` to the row at `index`, preserving its `date_submitted`
pub fn modify(
    records: &RecordSet,
    index: usize,
    update: ApplicationUpdate,
) -> Result<RecordSet, ServiceError> {
    if update.date_submitted.is_some() {
        debug!("Ignoring supplied date_submitted for row {}", index);
    }

    let mut next = records.clone();
    let row = next
        .get_mut(index)
        .ok_or_else(|| ServiceError::NotFound(format!("row {}", index)))?;
    update.apply_to(row).map_err(ServiceError::ValidationError)?;
    Ok(next)
}

/// Drop every row whose `column` equals `value` exactly; returns the kept rows and the count removed
pub fn delete_where(records: &RecordSet, column: Column, value: &str) -> (RecordSet, usize) {
    let mut next = records.clone();
    next.retain(|row| row.value(column) != value);
    let removed = records.len() - next.len();
    (next, removed)
}

/// Result of appending imported rows
pub struct ImportOutcome {
    pub records: RecordSet,
    pub imported: usize,
    pub rejected: Vec<(String, ValidationErrors)>,
}

/// Append each valid row; rows keep a well-formed submission date or are stamped with `now`
pub fn import_at(records: &RecordSet, rows: Vec<ImportRow>, now: NaiveDateTime) -> ImportOutcome {
    let stamp = now.format(DATE_FORMAT).to_string();
    let mut next = records.clone();
    let mut imported = 0;
    let mut rejected = Vec::new();

    for row in rows {
        let identifier = row.identifier();
        match row.into_row(&stamp) {
            Ok(row) => {
                next.push(row);
                imported += 1;
            }
            Err(errors) => rejected.push((identifier, errors)),
        }
    }

    ImportOutcome {
        records: next,
        imported,
        rejected,
    }
}
