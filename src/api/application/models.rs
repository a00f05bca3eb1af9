use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::rules::{known_status, link_shape, required, required_link, submission_date};
use crate::store::models::DATE_FORMAT;
use crate::store::{ApplicationRow, ApplicationStatus, Column};

/// Candidate for a new application, as typed into the add form
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
pub struct ApplicationDraft {
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub job_title: String,
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub company: String,
    #[serde(default)]
    pub requirements_matched: String,
    #[serde(default)]
    #[validate(custom(function = "required_link"))]
    pub link: String,
    #[serde(default)]
    #[validate(custom(function = "known_status"))]
    pub status: String,
    #[serde(default)]
    pub require_enhancement: String,
}

impl ApplicationDraft {
    fn normalized(mut self) -> Self {
        self.job_title = self.job_title.trim().to_string();
        self.company = self.company.trim().to_string();
        self.link = self.link.trim().to_string();
        self
    }

    /// Validate and turn the draft into a row stamped with `date_submitted`
    pub fn into_row(self, date_submitted: String) -> Result<ApplicationRow, ValidationErrors> {
        let draft = self.normalized();
        draft.validate()?;
        let status = parse_status(&draft.status)?;

        Ok(ApplicationRow {
            job_title: draft.job_title,
            company: draft.company,
            date_submitted,
            requirements_matched: draft.requirements_matched,
            link: draft.link,
            status,
            require_enhancement: draft.require_enhancement,
        })
    }
}

/// Field values for an existing application; `None` leaves a field as is.
///
/// `date_submitted` is accepted so a full form can be posted back, but it is
/// never applied.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
pub struct ApplicationUpdate {
    #[validate(custom(function = "required"))]
    pub job_title: Option<String>,
    #[validate(custom(function = "required"))]
    pub company: Option<String>,
    pub date_submitted: Option<String>,
    pub requirements_matched: Option<String>,
    #[validate(custom(function = "link_shape"))]
    pub link: Option<String>,
    #[validate(custom(function = "known_status"))]
    pub status: Option<String>,
    pub require_enhancement: Option<String>,
}

impl ApplicationUpdate {
    /// Validate, then write every supplied field except `date_submitted` into `row`
    pub fn apply_to(self, row: &mut ApplicationRow) -> Result<(), ValidationErrors> {
        self.validate()?;
        let status = self.status.as_deref().map(parse_status).transpose()?;

        if let Some(job_title) = self.job_title {
            row.job_title = job_title.trim().to_string();
        }
        if let Some(company) = self.company {
            row.company = company.trim().to_string();
        }
        if let Some(requirements_matched) = self.requirements_matched {
            row.requirements_matched = requirements_matched;
        }
        if let Some(link) = self.link {
            row.link = link.trim().to_string();
        }
        if let Some(status) = status {
            row.status = status;
        }
        if let Some(require_enhancement) = self.require_enhancement {
            row.require_enhancement = require_enhancement;
        }
        Ok(())
    }
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, ValidationErrors> {
    raw.parse().map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.add(
            "status",
            known_status(raw).err().unwrap_or_else(|| ValidationError::new("status")),
        );
        errors
    })
}

/// Modify form: the identifier picked from the list plus the new values
#[derive(Deserialize, Debug, Validate)]
pub struct ModifyRequest {
    #[validate(custom(function = "required"))]
    pub identifier: String,
    #[serde(flatten)]
    pub update: ApplicationUpdate,
}

/// Delete every row where `column` equals `value`
#[derive(Deserialize, Debug, Validate)]
pub struct DeleteRequest {
    pub column: Column,
    #[serde(default)]
    pub value: String,
}

/// One row of an imported tracker file, kept as raw text so a bad row
/// is reported instead of failing the whole upload
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ImportRow {
    #[serde(rename = "Job_Title", default)]
    pub job_title: String,
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "Date_Submitted", default)]
    pub date_submitted: String,
    #[serde(rename = "Requirements_Matched", default)]
    pub requirements_matched: String,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Require_Enhancement", default)]
    pub require_enhancement: String,
}

impl ImportRow {
    pub fn identifier(&self) -> String {
        format!("{} - {}", self.job_title, self.company)
    }

    /// Validate the row like a new entry. A submission date in the tracker's
    /// format is kept, an empty one is replaced by `stamp`.
    pub fn into_row(self, stamp: &str) -> Result<ApplicationRow, ValidationErrors> {
        let date = self.date_submitted.trim();
        let date_submitted = if date.is_empty() {
            Ok(stamp.to_string())
        } else {
            submission_date(date).map(|parsed| parsed.format(DATE_FORMAT).to_string())
        };

        let draft = ApplicationDraft {
            job_title: self.job_title,
            company: self.company,
            requirements_matched: self.requirements_matched,
            link: self.link,
            status: self.status,
            require_enhancement: self.require_enhancement,
        };

        match date_submitted {
            Ok(date_submitted) => draft.into_row(date_submitted),
            Err(date_error) => {
                let mut errors = draft
                    .normalized()
                    .validate()
                    .err()
                    .unwrap_or_else(ValidationErrors::new);
                errors.add("date_submitted", date_error);
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::tests::row;

    fn draft() -> ApplicationDraft {
        ApplicationDraft {
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            requirements_matched: "5/10".to_string(),
            link: "https://acme.com/jobs/1".to_string(),
            status: "Submitted".to_string(),
            require_enhancement: String::new(),
        }
    }

    #[test]
    fn draft_with_all_required_fields_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn draft_reports_each_missing_field() {
        let empty = ApplicationDraft {
            status: "Submitted".to_string(),
            ..Default::default()
        };
        let errors = empty.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("job_title"));
        assert!(fields.contains_key("company"));
        assert!(fields.contains_key("link"));
        assert!(!fields.contains_key("status"));
    }

    #[test]
    fn draft_rejects_unknown_status() {
        let errors = ApplicationDraft {
            status: "Ghosted".to_string(),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn into_row_trims_identity_fields() {
        let row = ApplicationDraft {
            job_title: "  Engineer ".to_string(),
            company: "Acme\t".to_string(),
            link: " https://acme.com/jobs/1 ".to_string(),
            ..draft()
        }
        .into_row("2024-05-01 09:30".to_string())
        .unwrap();

        assert_eq!(row.identifier(), "Engineer - Acme");
        assert_eq!(row.link, "https://acme.com/jobs/1");
        assert_eq!(row.date_submitted, "2024-05-01 09:30");
    }

    #[test]
    fn update_applies_supplied_fields_only() {
        let mut target = row("Engineer", "Acme");
        let update = ApplicationUpdate {
            status: Some("Interviewing".to_string()),
            require_enhancement: Some("Kubernetes".to_string()),
            ..Default::default()
        };

        update.apply_to(&mut target).unwrap();

        assert_eq!(target.status, ApplicationStatus::Interviewing);
        assert_eq!(target.require_enhancement, "Kubernetes");
        assert_eq!(target.job_title, "Engineer");
        assert_eq!(target.link, "https://acme.com/jobs/1");
    }

    #[test]
    fn update_allows_clearing_link_but_not_bad_links() {
        let mut target = row("Engineer", "Acme");
        ApplicationUpdate {
            link: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut target)
        .unwrap();
        assert_eq!(target.link, "");

        let errors = ApplicationUpdate {
            link: Some("acme.com".to_string()),
            ..Default::default()
        }
        .apply_to(&mut target)
        .unwrap_err();
        assert!(errors.field_errors().contains_key("link"));
    }

    #[test]
    fn failed_update_leaves_row_untouched() {
        let mut target = row("Engineer", "Acme");
        let before = target.clone();

        let result = ApplicationUpdate {
            job_title: Some("Staff Engineer".to_string()),
            status: Some("Pending".to_string()),
            ..Default::default()
        }
        .apply_to(&mut target);

        assert!(result.is_err());
        assert_eq!(target, before);
    }

    #[test]
    fn modify_request_flattens_fields() {
        let request: ModifyRequest = serde_json::from_value(serde_json::json!({
            "identifier": "Engineer - Acme",
            "status": "Rejected",
            "date_submitted": "1999-01-01 00:00"
        }))
        .unwrap();

        assert_eq!(request.identifier, "Engineer - Acme");
        assert_eq!(request.update.status.as_deref(), Some("Rejected"));
        assert_eq!(request.update.date_submitted.as_deref(), Some("1999-01-01 00:00"));
    }

    #[test]
    fn import_row_keeps_original_date() {
        let imported = ImportRow {
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            date_submitted: " 2023-11-02 14:05 ".to_string(),
            link: "https://acme.com/jobs/1".to_string(),
            status: "Submitted".to_string(),
            ..Default::default()
        }
        .into_row("2024-06-03 14:07")
        .unwrap();

        assert_eq!(imported.job_title, "Engineer");
        assert_eq!(imported.date_submitted, "2023-11-02 14:05");
    }

    #[test]
    fn import_row_without_date_takes_stamp() {
        let imported = ImportRow {
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            link: "https://acme.com/jobs/1".to_string(),
            status: "Submitted".to_string(),
            ..Default::default()
        }
        .into_row("2024-06-03 14:07")
        .unwrap();

        assert_eq!(imported.date_submitted, "2024-06-03 14:07");
    }

    #[test]
    fn import_row_reports_bad_date_with_other_fields() {
        let errors = ImportRow {
            company: "Acme".to_string(),
            date_submitted: "03/06/2024".to_string(),
            link: "https://acme.com/jobs/1".to_string(),
            status: "Submitted".to_string(),
            ..Default::default()
        }
        .into_row("2024-06-03 14:07")
        .unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("date_submitted"));
        assert!(fields.contains_key("job_title"));
    }
}
