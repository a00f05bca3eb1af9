use actix_web::HttpResponse;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

fn messages_for(field: &str, errors: &[validator::ValidationError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Validation error in field: {}", field))
        })
        .collect()
}

/// `{"<field>": {"errors": [...]}}` for every failing field
pub fn field_errors_json(validation_errors: &ValidationErrors) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    for (field, errors) in validation_errors.field_errors() {
        fields.insert(
            field.to_string(),
            serde_json::json!({"errors": messages_for(&field, errors)}),
        );
    }
    serde_json::Value::Object(fields)
}

/// One-line summary for logs and `Display`, fields in name order
pub fn describe(validation_errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| format!("{}: {}", field, messages_for(&field, errors).join(", ")))
        .collect();
    parts.sort();
    parts.join("; ")
}

fn bad_request(error: &str, fields: serde_json::Value) -> actix_web::Error {
    let error_response = ErrorResponse {
        error: error.to_string(),
        fields,
    };
    actix_web::error::InternalError::from_response(
        "",
        HttpResponse::BadRequest().json(error_response),
    )
    .into()
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .error_handler(|err, _req| {
            match err {
                actix_web_validator::Error::Validate(validation_errors) => {
                    bad_request("Validation failed", field_errors_json(&validation_errors))
                }
                actix_web_validator::Error::Deserialize(de_err) => {
                    let err_string = de_err.to_string();

                    let message = if err_string.contains("EOF while parsing") {
                        "Request body is empty. Expected JSON payload"
                    } else if err_string.contains("Unknown column") {
                        "Unknown column. Use one of: Job_Title, Company, Date_Submitted, Requirements_Matched, Link, Status, Require_Enhancement"
                    } else {
                        "Invalid JSON format"
                    };

                    bad_request(
                        "Request validation failed",
                        serde_json::json!({"message": message}),
                    )
                }
                _ => bad_request(
                    "Validation failed",
                    serde_json::json!({"message": "Validation error"}),
                ),
            }
        })
}
