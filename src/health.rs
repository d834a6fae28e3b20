use actix_web::web::Data;
use actix_web::{HttpResponse, get};
use serde::Serialize;

use crate::config::Config;
use crate::constants::APPLICATION_JSON;
use crate::dispatcher::Dispatcher;
use crate::store::BackendKind;

/// What the environment said about Firebase at startup, whether or not the
/// Firestore backend actually came up.
#[derive(Debug, Clone, Default)]
pub struct FirebaseStatus {
    pub has_valid_config: bool,
    pub project_id: Option<String>,
}

impl FirebaseStatus {
    pub fn from_config(config: &Config) -> Self {
        Self {
            has_valid_config: config.firebase.is_some(),
            project_id: config.firebase.as_ref().map(|c| c.project_id.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub message: String,
    pub backend: BackendKind,
    pub using_firebase: bool,
    pub has_valid_firebase_config: bool,
    pub firebase_project_id: Option<String>,
}

/// Reports which catalog backend this process committed to at startup.
#[get("/api/health")]
pub async fn health(
    dispatcher: Data<Dispatcher>,
    firebase: Data<FirebaseStatus>,
) -> HttpResponse {
    let backend = dispatcher.active_backend();

    HttpResponse::Ok()
        .content_type(APPLICATION_JSON)
        .json(Health {
            status: "ok",
            message: format!("Server is running with {backend} database"),
            backend,
            using_firebase: backend == BackendKind::Firestore,
            has_valid_firebase_config: firebase.has_valid_config,
            firebase_project_id: firebase.project_id.clone(),
        })
}
