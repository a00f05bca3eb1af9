use actix_web::{HttpResponse, Responder, error::BlockingError, get, web};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

use crate::api::application::ApplicationService;
use crate::store::{CsvStore, RecordSet};

/// The data source in use and the last committed snapshot read from or written to it
pub struct Session {
    pub service: ApplicationService,
    pub records: RecordSet,
}

impl Session {
    /// Open `store` and load its records
    pub fn open(store: CsvStore) -> Self {
        let service = ApplicationService::new(store);
        let records = service.load();
        Self { service, records }
    }

    pub fn reload(&mut self) {
        self.records = self.service.load();
    }
}

pub struct AppState {
    app_name: String,
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(name: &str, session: Session) -> Self {
        AppState {
            app_name: name.into(),
            session: Mutex::new(session),
        }
    }

    /// Exclusive access to the session; user actions run one at a time
    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run `action` on the locked session from the blocking thread pool.
///
/// Saves rewrite and sync the tracker file while the lock is held, so they
/// stay off the async workers.
pub async fn with_session<T, E, F>(state: web::Data<AppState>, action: F) -> Result<T, E>
where
    F: FnOnce(&mut Session) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<BlockingError> + Send + 'static,
{
    web::block(move || action(&mut state.session())).await?
}

#[derive(Serialize)]
struct StateResponse {
    app_name: String,
    source: String,
    total: usize,
}

#[get("")]
async fn get_state(data: web::Data<AppState>) -> impl Responder {
    let session = data.session();
    HttpResponse::Ok().json(StateResponse {
        app_name: data.app_name.clone(),
        source: session.service.store().path().display().to_string(),
        total: session.records.len(),
    })
}

pub fn state_config(config: &mut web::ServiceConfig) {
    config.service(web::scope("state").service(get_state));
}
