use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use std::fs;
use tracing::error;

use crate::api::state::AppState;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Reports the data file in use and the size of the in-memory snapshot.
#[get("/health")]
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let session = state.session();
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        storage: session.service.store().path().display().to_string(),
        records: Some(session.records.len()),
        error: None,
    })
}

/// Readiness check endpoint
///
/// Ready when the directory holding the data file exists, so a save can succeed.
#[get("/ready")]
async fn readiness_check(state: web::Data<AppState>) -> impl Responder {
    let path = state.session().service.store().path().to_path_buf();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };

    match fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => HttpResponse::Ok().json(HealthResponse {
            status: "ready".to_string(),
            storage: path.display().to_string(),
            records: None,
            error: None,
        }),
        Ok(_) => {
            error!("Readiness check failed: {} is not a directory", dir.display());
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "not_ready".to_string(),
                storage: path.display().to_string(),
                records: None,
                error: Some(format!("{} is not a directory", dir.display())),
            })
        }
        Err(e) => {
            error!("Readiness check failed: storage unavailable: {:?}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "not_ready".to_string(),
                storage: path.display().to_string(),
                records: None,
                error: Some(format!("Storage unavailable: {}", e)),
            })
        }
    }
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not touch storage.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive".to_string(),
        storage: "not_checked".to_string(),
        records: None,
        error: None,
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
