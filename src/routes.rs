use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::{games, guides, health, metrics, tier_lists};

/// Registers every handler plus extractor configs that keep error bodies in
/// the `{"error": ...}` shape.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(games::list)
        .service(games::get)
        .service(guides::add_guide)
        .service(tier_lists::add_tier_list)
        .service(metrics::metrics_endpoint);
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": format!("Invalid request body: {err}") });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Every path parameter is a game id; one that does not parse as `i32` can
/// not name a stored game.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": "Game not found" });
        InternalError::from_response(err, HttpResponse::NotFound().json(body)).into()
    })
}
