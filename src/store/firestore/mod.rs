//! Cloud Firestore backend over the REST API.
//!
//! Layout: a top-level `games` collection keyed by the stringified game id,
//! each game document owning `guides` and `tierLists` subcollections keyed
//! the same way. Every logical operation is a sequence of independent round
//! trips; nothing is wrapped in a Firestore transaction.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

use super::{BackendKind, Catalog, Seedable};
use crate::config::FirebaseCredentials;
use crate::constants::{FIRESTORE_API, GOOGLE_TOKEN_URL};
use crate::error::CatalogError;
use crate::models::{Game, Guide, NewEntry, TierList, next_id};

mod auth;
mod document;
#[cfg(test)]
mod fake;

use auth::ServiceAccount;
use document::{Document, DocumentList, game_fields, guide_fields, tier_list_fields};

const GAMES: &str = "games";
const GUIDES: &str = "guides";
const TIER_LISTS: &str = "tierLists";

const PAGE_SIZE: &str = "300";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Attempts at claiming a fresh child id before giving up on a write.
const MAX_CREATE_ATTEMPTS: usize = 5;

pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    account: ServiceAccount,
}

impl FirestoreStore {
    /// Parses the credentials and proves them by fetching a first access
    /// token.
    pub async fn connect(credentials: &FirebaseCredentials) -> Result<Self, CatalogError> {
        Self::connect_to(credentials, FIRESTORE_API, GOOGLE_TOKEN_URL).await
    }

    /// [`FirestoreStore::connect`] against explicit API and token endpoints.
    pub async fn connect_to(
        credentials: &FirebaseCredentials,
        api_base: &str,
        token_url: &str,
    ) -> Result<Self, CatalogError> {
        let account = ServiceAccount::new(
            &credentials.client_email,
            &credentials.private_key,
            token_url,
        )?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let store = Self {
            client,
            documents_url: format!(
                "{api_base}/projects/{}/databases/(default)/documents",
                credentials.project_id
            ),
            account,
        };
        store.account.access_token(&store.client).await?;

        Ok(store)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.documents_url, path)
    }

    async fn check(response: Response) -> Result<Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Unavailable(format!("Firestore returned {status}: {body}")))
    }

    async fn fetch_document(&self, path: &str) -> Result<Option<Document>, CatalogError> {
        let token = self.account.access_token(&self.client).await?;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = Self::check(response).await?.json::<Document>().await?;
        Ok(Some(document))
    }

    async fn list_page(
        &self,
        collection: &str,
        page_size: &str,
        page_token: Option<&str>,
    ) -> Result<DocumentList, CatalogError> {
        let token = self.account.access_token(&self.client).await?;

        let mut query = vec![("pageSize", page_size)];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let response = self
            .client
            .get(self.url(collection))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DocumentList::default());
        }

        Ok(Self::check(response).await?.json::<DocumentList>().await?)
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, CatalogError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(collection, PAGE_SIZE, page_token.as_deref())
                .await?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// Create-only write. `Ok(false)` when a document with that id exists.
    async fn create_document(
        &self,
        collection: &str,
        id: i32,
        fields: Value,
    ) -> Result<bool, CatalogError> {
        let token = self.account.access_token(&self.client).await?;
        let response = self
            .client
            .post(self.url(collection))
            .bearer_auth(token)
            .query(&[("documentId", id.to_string())])
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(false);
        }

        Self::check(response).await?;
        Ok(true)
    }

    async fn load_game(&self, document: &Document) -> Result<Game, CatalogError> {
        let mut game = document.to_game()?;

        let mut guides = self
            .list_documents(&format!("{GAMES}/{}/{GUIDES}", game.id))
            .await?
            .iter()
            .map(Document::to_guide)
            .collect::<Result<Vec<_>, _>>()?;
        guides.sort_by_key(|g| g.id);

        let mut tier_lists = self
            .list_documents(&format!("{GAMES}/{}/{TIER_LISTS}", game.id))
            .await?
            .iter()
            .map(Document::to_tier_list)
            .collect::<Result<Vec<_>, _>>()?;
        tier_lists.sort_by_key(|t| t.id);

        game.guides = guides;
        game.tier_lists = tier_lists;
        Ok(game)
    }

    /// Claims `max(sibling ids) + 1` in a game's subcollection with a
    /// create-only write, recomputing the id whenever a concurrent writer
    /// got there first.
    async fn append_child<T: Send>(
        &self,
        game_id: i32,
        subcollection: &str,
        build: impl Fn(i32) -> (T, Value) + Send,
    ) -> Result<T, CatalogError> {
        if self.fetch_document(&format!("{GAMES}/{game_id}")).await?.is_none() {
            return Err(CatalogError::game_not_found(game_id));
        }

        let collection = format!("{GAMES}/{game_id}/{subcollection}");
        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let siblings = self.list_documents(&collection).await?;
            let id = next_id(siblings.iter().filter_map(|d| d.id().ok()));

            let (record, fields) = build(id);
            if self.create_document(&collection, id, fields).await? {
                debug!("Created {collection}/{id}");
                return Ok(record);
            }

            warn!("{collection}/{id} already exists, retrying ({attempt}/{MAX_CREATE_ATTEMPTS})");
        }

        Err(CatalogError::Unavailable(format!(
            "could not allocate an id in {collection}"
        )))
    }
}

#[async_trait]
impl Catalog for FirestoreStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Firestore
    }

    async fn list_games(&self) -> Result<Vec<Game>, CatalogError> {
        let mut games = Vec::new();
        for document in self.list_documents(GAMES).await? {
            games.push(self.load_game(&document).await?);
        }
        games.sort_by_key(|g| g.id);

        Ok(games)
    }

    async fn game_by_id(&self, id: i32) -> Result<Option<Game>, CatalogError> {
        match self.fetch_document(&format!("{GAMES}/{id}")).await? {
            Some(document) => Ok(Some(self.load_game(&document).await?)),
            None => Ok(None),
        }
    }

    async fn add_guide(&self, game_id: i32, entry: &NewEntry) -> Result<Guide, CatalogError> {
        self.append_child(game_id, GUIDES, |id| {
            let guide = Guide::create(id, entry);
            let fields = guide_fields(&guide);
            (guide, fields)
        })
        .await
    }

    async fn add_tier_list(
        &self,
        game_id: i32,
        entry: &NewEntry,
    ) -> Result<TierList, CatalogError> {
        self.append_child(game_id, TIER_LISTS, |id| {
            let tier_list = TierList::create(id, entry);
            let fields = tier_list_fields(&tier_list);
            (tier_list, fields)
        })
        .await
    }
}

#[async_trait]
impl Seedable for FirestoreStore {
    async fn is_empty(&self) -> Result<bool, CatalogError> {
        let page = self.list_page(GAMES, "1", None).await?;
        Ok(page.documents.is_empty())
    }

    async fn insert_game(&self, game: &Game) -> Result<(), CatalogError> {
        self.create_document(GAMES, game.id, game_fields(game))
            .await?;

        let guides = format!("{GAMES}/{}/{GUIDES}", game.id);
        for guide in &game.guides {
            self.create_document(&guides, guide.id, guide_fields(guide))
                .await?;
        }

        let tier_lists = format!("{GAMES}/{}/{TIER_LISTS}", game.id);
        for tier_list in &game.tier_lists {
            self.create_document(&tier_lists, tier_list.id, tier_list_fields(tier_list))
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeFirestore, FakeState};
    use super::*;
    use crate::seed::{sample_games, seed_if_empty};

    fn entry(title: &str) -> NewEntry {
        NewEntry {
            title: title.into(),
            author: "Tester".into(),
            content: String::new(),
        }
    }

    async fn seeded(page_size: usize) -> (FakeFirestore, FirestoreStore) {
        let fake = FakeFirestore::start(FakeState::new(page_size, 3600)).await;
        let store = fake.connect().await;
        assert!(seed_if_empty(&store, &sample_games()).await.unwrap());
        (fake, store)
    }

    #[actix_rt::test]
    async fn seeding_twice_writes_once() {
        let fake = FakeFirestore::start(FakeState::new(300, 3600)).await;
        let store = fake.connect().await;
        assert!(store.is_empty().await.unwrap());

        assert!(seed_if_empty(&store, &sample_games()).await.unwrap());
        let creates = fake.state.create_requests();
        assert_eq!(creates, 7 + 21 + 14);

        assert!(!store.is_empty().await.unwrap());
        assert!(!seed_if_empty(&store, &sample_games()).await.unwrap());
        assert_eq!(fake.state.create_requests(), creates);

        assert_eq!(store.list_games().await.unwrap(), sample_games());
        fake.stop().await;
    }

    #[actix_rt::test]
    async fn listing_follows_page_tokens() {
        let (fake, store) = seeded(2).await;

        let games = store.list_games().await.unwrap();
        assert_eq!(games, sample_games());
        assert!(games.iter().all(|g| g.guides.len() == 3));
        assert!(fake.state.page_token_requests() > 0);

        fake.stop().await;
    }

    #[actix_rt::test]
    async fn new_children_follow_highest_sibling() {
        let (fake, store) = seeded(2).await;

        let guide = store.add_guide(1, &entry("Zero Build")).await.unwrap();
        assert_eq!(guide.id, 104);
        assert_eq!(guide.likes, 0);

        let tier_list = store.add_tier_list(1, &entry("Skins")).await.unwrap();
        assert_eq!(tier_list.id, 903);
        assert_eq!(tier_list.votes, 0);

        let game = store.game_by_id(1).await.unwrap().unwrap();
        assert_eq!(game.guides.last(), Some(&guide));
        assert_eq!(game.tier_lists.last(), Some(&tier_list));

        fake.stop().await;
    }

    #[actix_rt::test]
    async fn lost_race_retries_with_next_id() {
        let (fake, store) = seeded(300).await;
        fake.state.race_next_create("games/1/guides");

        let guide = store.add_guide(1, &entry("Late")).await.unwrap();
        assert_eq!(guide.id, 105);
        assert_eq!(
            fake.state.document_ids("games/1/guides"),
            vec![101, 102, 103, 104, 105]
        );

        fake.stop().await;
    }

    #[actix_rt::test]
    async fn gives_up_after_bounded_attempts() {
        let (fake, store) = seeded(300).await;
        fake.state.set_always_conflict(true);
        let before = fake.state.create_requests();

        let result = store.add_tier_list(2, &entry("Never")).await;
        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
        assert_eq!(fake.state.create_requests() - before, MAX_CREATE_ATTEMPTS);

        fake.stop().await;
    }

    #[actix_rt::test]
    async fn unknown_game_is_not_found() {
        let (fake, store) = seeded(300).await;
        let before = fake.state.create_requests();

        assert_eq!(store.game_by_id(999).await.unwrap(), None);
        assert!(matches!(
            store.add_guide(999, &entry("T")).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            store.add_tier_list(999, &entry("T")).await,
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(fake.state.create_requests(), before);

        fake.stop().await;
    }
}
