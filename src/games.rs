use actix_web::web::{Data, Path};
use actix_web::{HttpResponse, get};

use crate::constants::APPLICATION_JSON;
use crate::dispatcher::Dispatcher;
use crate::error::CatalogError;

#[get("/api/games")]
pub async fn list(dispatcher: Data<Dispatcher>) -> Result<HttpResponse, CatalogError> {
    let games = dispatcher.list_games().await?;

    Ok(HttpResponse::Ok()
        .content_type(APPLICATION_JSON)
        .json(games))
}

#[get("/api/games/{id}")]
pub async fn get(
    dispatcher: Data<Dispatcher>,
    path: Path<(i32,)>,
) -> Result<HttpResponse, CatalogError> {
    let (game_id,) = path.into_inner();

    match dispatcher.game_by_id(game_id).await? {
        Some(game) => Ok(HttpResponse::Ok()
            .content_type(APPLICATION_JSON)
            .json(game)),
        None => Err(CatalogError::NotFound("Game not found".into())),
    }
}
