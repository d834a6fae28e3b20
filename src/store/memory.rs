use async_trait::async_trait;
use parking_lot::RwLock;

use super::{BackendKind, Catalog, Seedable};
use crate::error::CatalogError;
use crate::models::{Game, Guide, NewEntry, TierList};
use crate::seed::sample_games;

/// Process-local catalog. Id assignment and append happen under one write
/// lock, so sibling ids never collide.
pub struct MemoryStore {
    games: RwLock<Vec<Game>>,
}

impl MemoryStore {
    pub fn new(games: Vec<Game>) -> Self {
        Self {
            games: RwLock::new(games),
        }
    }

    pub fn seeded() -> Self {
        Self::new(sample_games())
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn list_games(&self) -> Result<Vec<Game>, CatalogError> {
        Ok(self.games.read().clone())
    }

    async fn game_by_id(&self, id: i32) -> Result<Option<Game>, CatalogError> {
        Ok(self.games.read().iter().find(|g| g.id == id).cloned())
    }

    async fn add_guide(&self, game_id: i32, entry: &NewEntry) -> Result<Guide, CatalogError> {
        let mut games = self.games.write();
        let game = games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(|| CatalogError::game_not_found(game_id))?;

        let guide = Guide::create(game.next_guide_id(), entry);
        game.guides.push(guide.clone());

        Ok(guide)
    }

    async fn add_tier_list(
        &self,
        game_id: i32,
        entry: &NewEntry,
    ) -> Result<TierList, CatalogError> {
        let mut games = self.games.write();
        let game = games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(|| CatalogError::game_not_found(game_id))?;

        let tier_list = TierList::create(game.next_tier_list_id(), entry);
        game.tier_lists.push(tier_list.clone());

        Ok(tier_list)
    }
}

#[async_trait]
impl Seedable for MemoryStore {
    async fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.games.read().is_empty())
    }

    async fn insert_game(&self, game: &Game) -> Result<(), CatalogError> {
        let mut games = self.games.write();
        match games.iter_mut().find(|g| g.id == game.id) {
            Some(existing) => *existing = game.clone(),
            None => games.push(game.clone()),
        }
        Ok(())
    }
}
