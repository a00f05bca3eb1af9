use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::{
    HttpResponse, delete, get, post, put,
    web::{Data, Path, ServiceConfig, scope},
};
use actix_web_validator::Json;
use std::fs::File;

use crate::api::state::{AppState, with_session};
use crate::store::Column;
use super::dto::{
    ApplicationResponse, ApplicationsResponse, ColumnValuesResponse, DeleteResponse,
    IdentifiersResponse, ModifyResponse,
};
use super::models::{ApplicationDraft, DeleteRequest, ModifyRequest};
use super::service::ServiceError;

#[derive(MultipartForm)]
pub struct ImportUpload {
    file: TempFile,
}

#[get("")]
async fn list_applications(state: Data<AppState>) -> HttpResponse {
    let session = state.session();
    HttpResponse::Ok().json(ApplicationsResponse {
        total: session.records.len(),
        applications: session.records.clone(),
    })
}

#[post("")]
async fn add_application(
    state: Data<AppState>,
    draft: Json<ApplicationDraft>,
) -> Result<HttpResponse, ServiceError> {
    let draft = draft.into_inner();
    let (application, total) = with_session(state, move |session| {
        let committed = session.service.add(&session.records, draft)?;
        session.records = committed.records;
        Ok::<_, ServiceError>((committed.outcome, session.records.len()))
    })
    .await?;

    Ok(HttpResponse::Created().json(ApplicationResponse {
        message: "Application saved".to_string(),
        application,
        total,
    }))
}

#[get("/identifiers")]
async fn list_identifiers(state: Data<AppState>) -> HttpResponse {
    let session = state.session();
    HttpResponse::Ok().json(IdentifiersResponse {
        identifiers: session.records.identifiers(),
    })
}

#[put("")]
async fn modify_application(
    state: Data<AppState>,
    request: Json<ModifyRequest>,
) -> Result<HttpResponse, ServiceError> {
    let ModifyRequest { identifier, update } = request.into_inner();

    let target = identifier.clone();
    let (index, application) = with_session(state, move |session| {
        let committed = session.service.modify(&session.records, &target, update)?;
        session.records = committed.records;
        Ok::<_, ServiceError>(committed.outcome)
    })
    .await?;

    Ok(HttpResponse::Ok().json(ModifyResponse {
        message: format!("Entry '{}' modified successfully", identifier),
        index,
        application,
    }))
}

#[get("/columns/{column}/values")]
async fn column_values(
    state: Data<AppState>,
    column: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let column: Column = column.parse().map_err(ServiceError::InvalidInput)?;
    let session = state.session();

    Ok(HttpResponse::Ok().json(ColumnValuesResponse {
        column,
        values: session.records.distinct_values(column),
    }))
}

#[delete("")]
async fn delete_applications(
    state: Data<AppState>,
    request: Json<DeleteRequest>,
) -> Result<HttpResponse, ServiceError> {
    let DeleteRequest { column, value } = request.into_inner();

    let needle = value.clone();
    let (removed, total) = with_session(state, move |session| {
        let committed = session.service.delete_where(&session.records, column, &needle)?;
        session.records = committed.records;
        Ok::<_, ServiceError>((committed.outcome, session.records.len()))
    })
    .await?;

    let message = if removed > 0 {
        format!("Deleted {} row(s) where '{}' was '{}'", removed, column, value)
    } else {
        format!("No rows found with the value '{}' to delete", value)
    };

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message,
        removed,
        total,
    }))
}

#[post("/import")]
async fn import_applications(
    state: Data<AppState>,
    MultipartForm(upload): MultipartForm<ImportUpload>,
) -> Result<HttpResponse, ServiceError> {
    let file = File::open(upload.file.file.path())
        .map_err(|e| ServiceError::InvalidInput(format!("Could not read upload: {}", e)))?;

    let summary = with_session(state, move |session| {
        let committed = session.service.import_csv(&session.records, file)?;
        session.records = committed.records;
        Ok::<_, ServiceError>(committed.outcome)
    })
    .await?;

    Ok(HttpResponse::Ok().json(summary))
}

pub fn application_config(config: &mut ServiceConfig) {
    config.service(
        scope("applications")
            .service(list_applications)
            .service(add_application)
            .service(modify_application)
            .service(delete_applications)
            .service(list_identifiers)
            .service(column_values)
            .service(import_applications),
    );
}
