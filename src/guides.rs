use actix_web::web::{Data, Json, Path};
use actix_web::{HttpResponse, post};
use log::info;

use crate::constants::APPLICATION_JSON;
use crate::dispatcher::Dispatcher;
use crate::error::CatalogError;
use crate::models::EntryRequest;

/// add a guide to a game `/api/games/{id}/guides`
#[post("/api/games/{id}/guides")]
pub async fn add_guide(
    dispatcher: Data<Dispatcher>,
    path: Path<(i32,)>,
    body: Json<EntryRequest>,
) -> Result<HttpResponse, CatalogError> {
    let (game_id,) = path.into_inner();

    let guide = dispatcher.add_guide(game_id, body.into_inner()).await?;
    info!("Added guide {} to game {}", guide.id, game_id);

    Ok(HttpResponse::Created()
        .content_type(APPLICATION_JSON)
        .json(guide))
}
