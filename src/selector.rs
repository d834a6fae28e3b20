use std::sync::Arc;

use actix_web::web;
use log::{error, info};

use crate::config::{Config, FirebaseCredentials};
use crate::error::CatalogError;
use crate::seed::{sample_games, seed_if_empty};
use crate::store::Catalog;
use crate::store::firestore::FirestoreStore;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;

/// Picks the catalog backend once, before the server starts accepting
/// requests. Complete Firebase credentials win over `DATABASE_URL`; any
/// failure while connecting or seeding commits to the in-memory store for
/// the rest of the process lifetime.
pub async fn select_backend(config: &Config, memory: Arc<MemoryStore>) -> Arc<dyn Catalog> {
    let memory: Arc<dyn Catalog> = memory;

    if let Some(credentials) = &config.firebase {
        info!(
            "Firebase configuration found, connecting to project {}",
            credentials.project_id
        );
        return match connect_firestore(credentials).await {
            Ok(store) => store,
            Err(e) => {
                error!("Error initializing Firestore, using in-memory catalog: {e}");
                memory
            }
        };
    }

    if let Some(database_url) = &config.database_url {
        info!("DATABASE_URL found, connecting to Postgres");
        return match connect_postgres(database_url, config.pool_size).await {
            Ok(store) => store,
            Err(e) => {
                error!("Error initializing Postgres, using in-memory catalog: {e}");
                memory
            }
        };
    }

    info!("No external storage configured, using in-memory catalog");
    memory
}

async fn connect_firestore(
    credentials: &FirebaseCredentials,
) -> Result<Arc<dyn Catalog>, CatalogError> {
    let store = FirestoreStore::connect(credentials).await?;
    seed_if_empty(&store, &sample_games()).await?;
    Ok(Arc::new(store))
}

async fn connect_postgres(
    database_url: &str,
    pool_size: u32,
) -> Result<Arc<dyn Catalog>, CatalogError> {
    let database_url = database_url.to_string();
    let store = web::block(move || PgStore::connect(&database_url, pool_size))
        .await
        .map_err(|e| CatalogError::Unavailable(e.to_string()))??;

    seed_if_empty(&store, &sample_games()).await?;
    Ok(Arc::new(store))
}
