use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{App, HttpServer, middleware};
use log::info;

mod config;
mod constants;
mod dispatcher;
mod error;
mod games;
mod guides;
mod health;
mod metrics;
mod metrics_middleware;
mod models;
mod routes;
mod schema;
mod seed;
mod selector;
mod store;
mod tier_lists;

use config::Config;
use dispatcher::Dispatcher;
use health::FirebaseStatus;
use metrics_middleware::MetricsMiddleware;
use store::memory::MemoryStore;

#[actix_rt::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,actix_web=info,actix_server=info"),
    )
    .init();

    let config = Config::load().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // The memory store is always present so the dispatcher has somewhere to
    // go when the external backend drops out.
    let memory = Arc::new(MemoryStore::seeded());
    let active = selector::select_backend(&config, memory.clone()).await;
    let dispatcher = Data::new(Dispatcher::new(active, memory));
    let firebase = Data::new(FirebaseStatus::from_config(&config));

    info!(
        "Guide Genie listening on http://{}:{} ({} database)",
        config.host,
        config.port,
        dispatcher.active_backend()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_header(header::CONTENT_TYPE)
            .max_age(3600);

        App::new()
            .app_data(dispatcher.clone())
            .app_data(firebase.clone())
            .wrap(cors)
            .wrap(MetricsMiddleware)
            // enable logger - always register actix-web Logger middleware last
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
