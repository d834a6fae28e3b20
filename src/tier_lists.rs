use actix_web::web::{Data, Json, Path};
use actix_web::{HttpResponse, post};
use log::info;

use crate::constants::APPLICATION_JSON;
use crate::dispatcher::Dispatcher;
use crate::error::CatalogError;
use crate::models::EntryRequest;

/// add a tier list to a game `/api/games/{id}/tierlists`
#[post("/api/games/{id}/tierlists")]
pub async fn add_tier_list(
    dispatcher: Data<Dispatcher>,
    path: Path<(i32,)>,
    body: Json<EntryRequest>,
) -> Result<HttpResponse, CatalogError> {
    let (game_id,) = path.into_inner();

    let tier_list = dispatcher.add_tier_list(game_id, body.into_inner()).await?;
    info!("Added tier list {} to game {}", tier_list.id, game_id);

    Ok(HttpResponse::Created()
        .content_type(APPLICATION_JSON)
        .json(tier_list))
}
