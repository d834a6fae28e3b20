use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{info, warn};

use crate::error::CatalogError;
use crate::metrics::CATALOG_FALLBACKS_TOTAL;
use crate::models::{EntryRequest, Game, Guide, TierList};
use crate::store::memory::MemoryStore;
use crate::store::{BackendKind, Catalog};

/// Routes catalog operations to the active backend and re-issues them
/// against the in-memory store when the active backend fails transiently.
///
/// Semantic outcomes (a missing game, a rejected submission) are returned
/// as-is; only [`CatalogError::Unavailable`] advances to the next provider.
pub struct Dispatcher {
    active: BackendKind,
    providers: Vec<Arc<dyn Catalog>>,
}

impl Dispatcher {
    pub fn new(active: Arc<dyn Catalog>, memory: Arc<MemoryStore>) -> Self {
        let kind = active.kind();
        let mut providers = vec![active];
        if kind != BackendKind::Memory {
            providers.push(memory);
        }

        info!("Catalog dispatcher ready, active backend: {kind}");
        Self {
            active: kind,
            providers,
        }
    }

    pub fn active_backend(&self) -> BackendKind {
        self.active
    }

    async fn dispatch<T, F>(&self, operation: &'static str, call: F) -> Result<T, CatalogError>
    where
        F: Fn(Arc<dyn Catalog>) -> BoxFuture<'static, Result<T, CatalogError>>,
    {
        let mut last_error = CatalogError::Unavailable("no storage backend configured".into());

        for (index, provider) in self.providers.iter().enumerate() {
            match call(provider.clone()).await {
                Err(err) if err.is_transient() && index + 1 < self.providers.len() => {
                    warn!(
                        "{operation} failed on {} backend, retrying in memory: {err}",
                        provider.kind()
                    );
                    CATALOG_FALLBACKS_TOTAL
                        .with_label_values(&[operation, provider.kind().label()])
                        .inc();
                    last_error = err;
                }
                result => return result,
            }
        }

        Err(last_error)
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, CatalogError> {
        self.dispatch("list_games", |store| {
            async move { store.list_games().await }.boxed()
        })
        .await
    }

    pub async fn game_by_id(&self, id: i32) -> Result<Option<Game>, CatalogError> {
        self.dispatch("game_by_id", move |store| {
            async move { store.game_by_id(id).await }.boxed()
        })
        .await
    }

    /// Validates the submission before any backend is touched.
    pub async fn add_guide(
        &self,
        game_id: i32,
        request: EntryRequest,
    ) -> Result<Guide, CatalogError> {
        let entry = request.validate()?;
        self.dispatch("add_guide", move |store| {
            let entry = entry.clone();
            async move { store.add_guide(game_id, &entry).await }.boxed()
        })
        .await
    }

    pub async fn add_tier_list(
        &self,
        game_id: i32,
        request: EntryRequest,
    ) -> Result<TierList, CatalogError> {
        let entry = request.validate()?;
        self.dispatch("add_tier_list", move |store| {
            let entry = entry.clone();
            async move { store.add_tier_list(game_id, &entry).await }.boxed()
        })
        .await
    }
}
