//! Catalog storage backends.
//!
//! Every backend implements [`Catalog`]; the external ones also implement
//! [`Seedable`] so an empty store can be populated from the sample data at
//! startup. Errors are classified into [`CatalogError`] kinds at this
//! boundary so the dispatcher can decide whether a failure is worth retrying
//! against memory.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CatalogError;
use crate::models::{Game, Guide, NewEntry, TierList};

pub mod firestore;
pub mod memory;
pub mod postgres;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Firestore,
    Postgres,
}

impl BackendKind {
    /// Lowercase name used in metrics labels and the health payload.
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Firestore => "firestore",
            BackendKind::Postgres => "postgres",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Memory => "In-Memory",
            BackendKind::Firestore => "Firestore",
            BackendKind::Postgres => "Postgres",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn list_games(&self) -> Result<Vec<Game>, CatalogError>;

    /// `Ok(None)` is a legitimate miss, not a failure.
    async fn game_by_id(&self, id: i32) -> Result<Option<Game>, CatalogError>;

    async fn add_guide(&self, game_id: i32, entry: &NewEntry) -> Result<Guide, CatalogError>;

    async fn add_tier_list(&self, game_id: i32, entry: &NewEntry)
    -> Result<TierList, CatalogError>;
}

#[async_trait]
pub trait Seedable: Catalog {
    async fn is_empty(&self) -> Result<bool, CatalogError>;

    /// Writes the game together with its guides and tier lists.
    async fn insert_game(&self, game: &Game) -> Result<(), CatalogError>;
}
