use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header row of the tracker file, in column order
pub const HEADERS: [&str; 7] = [
    "Job_Title",
    "Company",
    "Date_Submitted",
    "Requirements_Matched",
    "Link",
    "Status",
    "Require_Enhancement",
];

/// Format used when stamping `Date_Submitted`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Application status, stored with its display label
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Submitted,
    Interviewing,
    Rejected,
    #[serde(rename = "Not Submitted")]
    NotSubmitted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Rejected,
        ApplicationStatus::NotSubmitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::NotSubmitted => "Not Submitted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

/// One persisted job application, one row of the tracker file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplicationRow {
    #[serde(rename = "Job_Title")]
    pub job_title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Date_Submitted", default)]
    pub date_submitted: String,
    #[serde(rename = "Requirements_Matched", default)]
    pub requirements_matched: String,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Status")]
    pub status: ApplicationStatus,
    #[serde(rename = "Require_Enhancement", default)]
    pub require_enhancement: String,
}

impl ApplicationRow {
    /// Display identifier used to pick a row for editing: `job_title - company`
    pub fn identifier(&self) -> String {
        format!("{} - {}", self.job_title, self.company)
    }

    /// Value of a column as it is written to the file
    pub fn value(&self, column: Column) -> &str {
        match column {
            Column::JobTitle => &self.job_title,
            Column::Company => &self.company,
            Column::DateSubmitted => &self.date_submitted,
            Column::RequirementsMatched => &self.requirements_matched,
            Column::Link => &self.link,
            Column::Status => self.status.as_str(),
            Column::RequireEnhancement => &self.require_enhancement,
        }
    }
}

/// Tracker column, addressable by header name (`Job_Title`) or field name (`job_title`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    JobTitle,
    Company,
    DateSubmitted,
    RequirementsMatched,
    Link,
    Status,
    RequireEnhancement,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::JobTitle,
        Column::Company,
        Column::DateSubmitted,
        Column::RequirementsMatched,
        Column::Link,
        Column::Status,
        Column::RequireEnhancement,
    ];

    pub fn header(&self) -> &'static str {
        HEADERS[*self as usize]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Column::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown column: {}", s))
    }
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Column {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.header())
    }
}

/// Ordered collection of applications; the unit of load and save.
///
/// Insertion order is preserved and no field is unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    rows: Vec<ApplicationRow>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ApplicationRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&ApplicationRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApplicationRow> {
        self.rows.iter()
    }

    pub(crate) fn push(&mut self, row: ApplicationRow) {
        self.rows.push(row);
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ApplicationRow> {
        self.rows.get_mut(index)
    }

    pub(crate) fn retain<F: FnMut(&ApplicationRow) -> bool>(&mut self, keep: F) {
        self.rows.retain(keep);
    }

    /// Identifiers in row order with duplicates collapsed
    pub fn identifiers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            let identifier = row.identifier();
            if !seen.contains(&identifier) {
                seen.push(identifier);
            }
        }
        seen
    }

    /// Distinct values of a column in row order
    pub fn distinct_values(&self, column: Column) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            let value = row.value(column);
            if !seen.iter().any(|v| v == value) {
                seen.push(value.to_string());
            }
        }
        seen
    }
}

impl From<Vec<ApplicationRow>> for RecordSet {
    fn from(rows: Vec<ApplicationRow>) -> Self {
        Self { rows }
    }
}

impl IntoIterator for RecordSet {
    type Item = ApplicationRow;
    type IntoIter = std::vec::IntoIter<ApplicationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(job_title: &str, company: &str) -> ApplicationRow {
        ApplicationRow {
            job_title: job_title.to_string(),
            company: company.to_string(),
            date_submitted: "2024-05-01 09:30".to_string(),
            requirements_matched: "5/10".to_string(),
            link: "https://acme.com/jobs/1".to_string(),
            status: ApplicationStatus::Submitted,
            require_enhancement: String::new(),
        }
    }

    #[test]
    fn status_labels_round_trip() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
        assert_eq!(ApplicationStatus::NotSubmitted.to_string(), "Not Submitted");
        assert!("submitted".parse::<ApplicationStatus>().is_err());
        assert!("".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn column_accepts_header_and_field_names() {
        assert_eq!("Job_Title".parse::<Column>(), Ok(Column::JobTitle));
        assert_eq!("require_enhancement".parse::<Column>(), Ok(Column::RequireEnhancement));
        assert_eq!(" Status ".parse::<Column>(), Ok(Column::Status));
        assert!("Salary".parse::<Column>().is_err());
        assert_eq!(Column::DateSubmitted.header(), "Date_Submitted");
    }

    #[test]
    fn identifier_joins_title_and_company() {
        assert_eq!(row("Engineer", "Acme").identifier(), "Engineer - Acme");
    }

    #[test]
    fn identifiers_collapse_duplicates_in_order() {
        let set = RecordSet::from(vec![
            row("Engineer", "Acme"),
            row("Analyst", "Globex"),
            row("Engineer", "Acme"),
        ]);
        assert_eq!(set.identifiers(), vec!["Engineer - Acme", "Analyst - Globex"]);
    }

    #[test]
    fn distinct_values_reads_status_labels() {
        let mut rejected = row("Analyst", "Globex");
        rejected.status = ApplicationStatus::Rejected;
        let set = RecordSet::from(vec![row("Engineer", "Acme"), rejected, row("Dev", "Initech")]);
        assert_eq!(set.distinct_values(Column::Status), vec!["Submitted", "Rejected"]);
    }
}
