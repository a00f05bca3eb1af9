use actix_web::{HttpResponse, get, post, put, web};
use actix_web_validator::Json;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::api::application::rules::required;
use crate::api::state::{AppState, Session};
use crate::store::CsvStore;

/// Request to point the tracker at another file
#[derive(Deserialize, Debug, Validate)]
pub struct SourceRequest {
    #[validate(custom(function = "required"))]
    pub path: String,
}

#[derive(Serialize)]
struct SourceResponse {
    message: String,
    path: String,
    total: usize,
}

fn describe(session: &Session, message: String) -> SourceResponse {
    SourceResponse {
        message,
        path: session.service.store().path().display().to_string(),
        total: session.records.len(),
    }
}

#[get("")]
async fn get_source(state: web::Data<AppState>) -> HttpResponse {
    let session = state.session();
    HttpResponse::Ok().json(describe(&session, "Current data source".to_string()))
}

/// Switch to another file and reload the snapshot from it
#[put("")]
async fn set_source(state: web::Data<AppState>, request: Json<SourceRequest>) -> HttpResponse {
    let new_path = request.into_inner().path.trim().to_string();
    let mut session = state.session();

    if session.service.store().path() == Path::new(&new_path) {
        return HttpResponse::Ok().json(describe(&session, "Path is unchanged".to_string()));
    }

    *session = Session::open(CsvStore::new(&new_path));
    info!("Data source switched to {}", new_path);

    HttpResponse::Ok().json(describe(
        &session,
        format!("File path updated and data reloaded from: {}", new_path),
    ))
}

/// Discard the in-memory snapshot and read the file again
#[post("/reload")]
async fn reload_source(state: web::Data<AppState>) -> HttpResponse {
    let mut session = state.session();
    session.reload();
    HttpResponse::Ok().json(describe(&session, "Data reloaded".to_string()))
}

pub fn source_config(config: &mut web::ServiceConfig) {
    config.service(
        web::scope("source")
            .service(get_source)
            .service(set_source)
            .service(reload_source),
    );
}
