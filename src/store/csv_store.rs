use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::store::models::{ApplicationRow, RecordSet, HEADERS};

/// Errors raised while reading or writing the tracker file
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem operation failed
    Io { path: PathBuf, source: io::Error },

    /// Row could not be encoded or decoded
    Csv(csv::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            StoreError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Csv(e) => Some(e),
        }
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Csv(e)
    }
}

/// Flat-file store holding the whole record set in one CSV file
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full record set.
    ///
    /// Never fails: a missing file yields an empty set (and an attempt to
    /// create a header-only file), an unreadable file yields an empty set and
    /// an error log. Unreadable content is overwritten by the next save.
    pub fn load(&self) -> RecordSet {
        match self.read() {
            Ok(Some(records)) => {
                info!("Loaded {} applications from {}", records.len(), self.path.display());
                records
            }
            Ok(None) => {
                match self.initialize() {
                    Ok(()) => info!("New data file initialized at {}", self.path.display()),
                    Err(e) => warn!(
                        "Could not initialize data file, using an empty table in memory: {}",
                        e
                    ),
                }
                RecordSet::new()
            }
            Err(e) => {
                error!(
                    "Error reading {}, file may be corrupted; starting from an empty table: {}",
                    self.path.display(),
                    e
                );
                RecordSet::new()
            }
        }
    }

    /// Read the file, `Ok(None)` when it does not exist
    pub fn read(&self) -> Result<Option<RecordSet>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No data file at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        read_rows(file).map(Some)
    }

    /// Overwrite the file with the complete record set.
    ///
    /// Rows are written to a sibling temporary file which is synced and then
    /// renamed over the target, so readers never observe a half-written file.
    pub fn save(&self, records: &RecordSet) -> Result<(), StoreError> {
        debug!("Saving {} applications to {}", records.len(), self.path.display());

        self.ensure_parent_dir()?;

        let temp_path = self.temp_path();
        let result = self.write_to(&temp_path, records).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
        });

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        debug!("Saved complete snapshot to {}", self.path.display());
        Ok(())
    }

    fn write_to(&self, target: &Path, records: &RecordSet) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: target.to_path_buf(),
            source,
        };

        let file = File::create(target).map_err(io_err)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer.write_record(HEADERS)?;
        for row in records.iter() {
            writer.serialize(row)?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| io_err(io::Error::new(e.error().kind(), e.error().to_string())))?;
        file.sync_all().map_err(io_err)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        self.ensure_parent_dir()?;
        let mut file = File::create(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        writeln!(file, "{}", HEADERS.join(",")).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tracker.csv".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

/// Decode tracker rows from any reader.
///
/// Header names are trimmed, unknown columns ignored and missing free-text
/// columns filled with empty strings.
pub fn read_rows<R: Read>(reader: R) -> Result<RecordSet, StoreError> {
    read_rows_as::<ApplicationRow, R>(reader).map(RecordSet::from)
}

/// Decode every row of a headed CSV into `T`, failing on the first bad row
pub fn read_rows_as<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let rows = reader.deserialize::<T>().collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::tests::row;
    use crate::store::models::ApplicationStatus;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CsvStore {
        CsvStore::new(dir.path().join("job_applications.csv"))
    }

    #[test]
    fn test_load_missing_file_is_empty_and_initializes() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let records = store.load();

        assert!(records.is_empty());
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim_end(), HEADERS.join(","));
    }

    #[test]
    fn test_load_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = CsvStore::new(temp_dir.path().join("JobData/tracker.csv"));

        assert!(store.load().is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let mut interviewing = row("Data Engineer", "Globex, Inc.");
        interviewing.status = ApplicationStatus::Interviewing;
        interviewing.require_enhancement = "Spark\n\"streaming\"".to_string();
        let mut pending = row("Analyst", "Initech");
        pending.status = ApplicationStatus::NotSubmitted;
        pending.link = String::new();
        pending.requirements_matched = String::new();

        let records = RecordSet::from(vec![row("Engineer", "Acme"), interviewing, pending]);
        store.save(&records).unwrap();

        assert_eq!(store.load(), records);
    }

    #[test]
    fn test_save_writes_header_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(&RecordSet::from(vec![row("Engineer", "Acme")])).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("Job_Title,Company,Date_Submitted,Requirements_Matched,Link,Status,Require_Enhancement")
        );
        assert_eq!(
            lines.next(),
            Some("Engineer,Acme,2024-05-01 09:30,5/10,https://acme.com/jobs/1,Submitted,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_save_empty_set_keeps_header() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.save(&RecordSet::from(vec![row("Engineer", "Acme")])).unwrap();
        store.save(&RecordSet::new()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim_end(), HEADERS.join(","));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupted_file_recovers_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::write(
            store.path(),
            "Job_Title,Company,Status\nEngineer,Acme,Maybe\n",
        )
        .unwrap();

        assert!(store.read().is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_ragged_rows_recover_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::write(store.path(), "Job_Title,Company\nEngineer,Acme,extra,cells\n").unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_missing_free_text_columns_default_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::write(
            store.path(),
            "Job_Title, Company, Date_Submitted, Link, Status\n\
             Engineer,Acme,2024-05-01 09:30,https://acme.com/jobs/1,Rejected\n",
        )
        .unwrap();

        let records = store.load();

        assert_eq!(records.len(), 1);
        let loaded = &records.rows()[0];
        assert_eq!(loaded.status, ApplicationStatus::Rejected);
        assert_eq!(loaded.requirements_matched, "");
        assert_eq!(loaded.require_enhancement, "");
    }

    #[test]
    fn test_missing_identity_column_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let legacy = "Company,Date_Submitted,Link,Status\n\
                      Acme,2024-05-01 09:30,https://acme.com/jobs/1,Rejected\n";
        fs::write(store.path(), legacy).unwrap();

        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), legacy);
    }

    #[test]
    fn test_save_failure_reports_cause() {
        let temp_dir = TempDir::new().unwrap();
        // A directory sitting where the file should be makes the rename fail
        let target = temp_dir.path().join("job_applications.csv");
        fs::create_dir(&target).unwrap();
        let store = CsvStore::new(&target);

        let err = store.save(&RecordSet::from(vec![row("Engineer", "Acme")])).unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("job_applications.csv"));
        assert!(!temp_dir.path().join(".job_applications.csv.tmp").exists());
    }
}
