use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    pub fn game_not_found(game_id: i32) -> Self {
        CatalogError::NotFound(format!("Game with ID {game_id} not found"))
    }

    /// Only connectivity-style failures are worth retrying elsewhere.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Unavailable(_))
    }
}

impl From<diesel::result::Error> for CatalogError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => CatalogError::NotFound("Record not found".into()),
            other => CatalogError::Unavailable(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for CatalogError {
    fn from(err: r2d2::Error) -> Self {
        CatalogError::Unavailable(format!("connection pool: {err}"))
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Unavailable(err.to_string())
    }
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
