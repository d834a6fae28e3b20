use std::collections::HashMap;
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::dsl::{count_star, max};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use log::info;

use super::{BackendKind, Catalog, Seedable};
use crate::error::CatalogError;
use crate::models::{Game, Guide, NewEntry, TierList, next_id};
use crate::schema::{games, guides, tier_lists};

pub type DBPool = Pool<ConnectionManager<PgConnection>>;

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        publisher TEXT NOT NULL DEFAULT '',
        release_year INTEGER NOT NULL DEFAULT 0,
        popularity INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS guides (
        game_id INTEGER NOT NULL REFERENCES games (id),
        id INTEGER NOT NULL,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        likes INTEGER NOT NULL DEFAULT 0,
        created_on DATE NOT NULL DEFAULT CURRENT_DATE,
        PRIMARY KEY (game_id, id)
    );

    CREATE TABLE IF NOT EXISTS tier_lists (
        game_id INTEGER NOT NULL REFERENCES games (id),
        id INTEGER NOT NULL,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        votes INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (game_id, id)
    );
"#;

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct GameRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    publisher: String,
    release_year: i32,
    popularity: i32,
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = guides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct GuideRow {
    game_id: i32,
    id: i32,
    title: String,
    author: String,
    content: String,
    likes: i32,
    created_on: NaiveDate,
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = tier_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct TierListRow {
    game_id: i32,
    id: i32,
    title: String,
    author: String,
    content: String,
    votes: i32,
}

impl GameRow {
    fn from_game(game: &Game) -> Self {
        Self {
            id: game.id,
            name: game.name.clone(),
            description: game.description.clone(),
            category: game.category.clone(),
            publisher: game.publisher.clone(),
            release_year: game.release_year,
            popularity: game.popularity,
        }
    }

    fn into_game(self, guides: Vec<Guide>, tier_lists: Vec<TierList>) -> Game {
        Game {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            publisher: self.publisher,
            release_year: self.release_year,
            popularity: self.popularity,
            guides,
            tier_lists,
        }
    }
}

impl GuideRow {
    fn new(game_id: i32, guide: &Guide) -> Self {
        Self {
            game_id,
            id: guide.id,
            title: guide.title.clone(),
            author: guide.author.clone(),
            content: guide.content.clone(),
            likes: guide.likes,
            created_on: guide.date,
        }
    }
}

impl From<GuideRow> for Guide {
    fn from(row: GuideRow) -> Self {
        Guide {
            id: row.id,
            title: row.title,
            author: row.author,
            content: row.content,
            likes: row.likes,
            date: row.created_on,
        }
    }
}

impl TierListRow {
    fn new(game_id: i32, tier_list: &TierList) -> Self {
        Self {
            game_id,
            id: tier_list.id,
            title: tier_list.title.clone(),
            author: tier_list.author.clone(),
            content: tier_list.content.clone(),
            votes: tier_list.votes,
        }
    }
}

impl From<TierListRow> for TierList {
    fn from(row: TierListRow) -> Self {
        TierList {
            id: row.id,
            title: row.title,
            author: row.author,
            content: row.content,
            votes: row.votes,
        }
    }
}

/// Attaches child rows to their parent games, keeping the game order.
fn assemble(
    game_rows: Vec<GameRow>,
    guide_rows: Vec<GuideRow>,
    tier_list_rows: Vec<TierListRow>,
) -> Vec<Game> {
    let mut guides_by_game: HashMap<i32, Vec<Guide>> = HashMap::new();
    for row in guide_rows {
        guides_by_game.entry(row.game_id).or_default().push(row.into());
    }

    let mut tier_lists_by_game: HashMap<i32, Vec<TierList>> = HashMap::new();
    for row in tier_list_rows {
        tier_lists_by_game.entry(row.game_id).or_default().push(row.into());
    }

    game_rows
        .into_iter()
        .map(|row| {
            let guides = guides_by_game.remove(&row.id).unwrap_or_default();
            let tier_lists = tier_lists_by_game.remove(&row.id).unwrap_or_default();
            row.into_game(guides, tier_lists)
        })
        .collect()
}

/// Takes a row lock on the parent game so concurrent inserts for the same
/// game serialize their id assignment.
fn lock_game(conn: &mut PgConnection, game_id: i32) -> Result<(), CatalogError> {
    games::table
        .find(game_id)
        .select(games::id)
        .for_update()
        .first::<i32>(conn)
        .optional()?
        .map(|_| ())
        .ok_or_else(|| CatalogError::game_not_found(game_id))
}

pub struct PgStore {
    pool: DBPool,
}

impl PgStore {
    /// Builds the pool and creates missing tables. Blocking: call it from a
    /// blocking context.
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, CatalogError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        let mut conn = pool.get()?;
        conn.batch_execute(CREATE_TABLES)?;
        info!("Postgres schema ready");

        Ok(Self { pool })
    }

    async fn run<T, F>(&self, query: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, CatalogError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        web::block(move || {
            let mut conn = pool.get()?;
            query(&mut conn)
        })
        .await
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl Catalog for PgStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Postgres
    }

    async fn list_games(&self) -> Result<Vec<Game>, CatalogError> {
        self.run(|conn| {
            let game_rows = games::table
                .order(games::id.asc())
                .select(GameRow::as_select())
                .load(conn)?;
            let guide_rows = guides::table
                .order((guides::game_id.asc(), guides::id.asc()))
                .select(GuideRow::as_select())
                .load(conn)?;
            let tier_list_rows = tier_lists::table
                .order((tier_lists::game_id.asc(), tier_lists::id.asc()))
                .select(TierListRow::as_select())
                .load(conn)?;

            Ok(assemble(game_rows, guide_rows, tier_list_rows))
        })
        .await
    }

    async fn game_by_id(&self, id: i32) -> Result<Option<Game>, CatalogError> {
        self.run(move |conn| {
            let Some(game_row) = games::table
                .find(id)
                .select(GameRow::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let guide_rows = guides::table
                .filter(guides::game_id.eq(id))
                .order(guides::id.asc())
                .select(GuideRow::as_select())
                .load(conn)?;
            let tier_list_rows = tier_lists::table
                .filter(tier_lists::game_id.eq(id))
                .order(tier_lists::id.asc())
                .select(TierListRow::as_select())
                .load(conn)?;

            Ok(assemble(vec![game_row], guide_rows, tier_list_rows).pop())
        })
        .await
    }

    async fn add_guide(&self, game_id: i32, entry: &NewEntry) -> Result<Guide, CatalogError> {
        let entry = entry.clone();
        self.run(move |conn| {
            conn.transaction::<_, CatalogError, _>(|conn| {
                lock_game(conn, game_id)?;

                let highest: Option<i32> = guides::table
                    .filter(guides::game_id.eq(game_id))
                    .select(max(guides::id))
                    .first(conn)?;

                let guide = Guide::create(next_id(highest.into_iter()), &entry);
                diesel::insert_into(guides::table)
                    .values(GuideRow::new(game_id, &guide))
                    .execute(conn)?;

                Ok(guide)
            })
        })
        .await
    }

    async fn add_tier_list(
        &self,
        game_id: i32,
        entry: &NewEntry,
    ) -> Result<TierList, CatalogError> {
        let entry = entry.clone();
        self.run(move |conn| {
            conn.transaction::<_, CatalogError, _>(|conn| {
                lock_game(conn, game_id)?;

                let highest: Option<i32> = tier_lists::table
                    .filter(tier_lists::game_id.eq(game_id))
                    .select(max(tier_lists::id))
                    .first(conn)?;

                let tier_list = TierList::create(next_id(highest.into_iter()), &entry);
                diesel::insert_into(tier_lists::table)
                    .values(TierListRow::new(game_id, &tier_list))
                    .execute(conn)?;

                Ok(tier_list)
            })
        })
        .await
    }
}

#[async_trait]
impl Seedable for PgStore {
    async fn is_empty(&self) -> Result<bool, CatalogError> {
        self.run(|conn| {
            let total: i64 = games::table.select(count_star()).first(conn)?;
            Ok(total == 0)
        })
        .await
    }

    async fn insert_game(&self, game: &Game) -> Result<(), CatalogError> {
        let game_row = GameRow::from_game(game);
        let guide_rows: Vec<GuideRow> = game
            .guides
            .iter()
            .map(|g| GuideRow::new(game.id, g))
            .collect();
        let tier_list_rows: Vec<TierListRow> = game
            .tier_lists
            .iter()
            .map(|t| TierListRow::new(game.id, t))
            .collect();

        self.run(move |conn| {
            conn.transaction::<_, CatalogError, _>(|conn| {
                diesel::insert_into(games::table)
                    .values(&game_row)
                    .on_conflict_do_nothing()
                    .execute(conn)?;
                if !guide_rows.is_empty() {
                    diesel::insert_into(guides::table)
                        .values(&guide_rows)
                        .on_conflict_do_nothing()
                        .execute(conn)?;
                }
                if !tier_list_rows.is_empty() {
                    diesel::insert_into(tier_lists::table)
                        .values(&tier_list_rows)
                        .on_conflict_do_nothing()
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }
}
