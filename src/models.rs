use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub publisher: String,
    pub release_year: i32,
    pub popularity: i32,
    #[serde(default)]
    pub guides: Vec<Guide>,
    #[serde(default)]
    pub tier_lists: Vec<TierList>,
}

impl Game {
    pub fn next_guide_id(&self) -> i32 {
        next_id(self.guides.iter().map(|g| g.id))
    }

    pub fn next_tier_list_id(&self) -> i32 {
        next_id(self.tier_lists.iter().map(|t| t.id))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Guide {
    pub id: i32,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub content: String,
    pub likes: i32,
    pub date: NaiveDate,
}

impl Guide {
    /// Fresh guide dated with the server's local calendar day.
    pub fn create(id: i32, entry: &NewEntry) -> Self {
        Self {
            id,
            title: entry.title.clone(),
            author: entry.author.clone(),
            content: entry.content.clone(),
            likes: 0,
            date: Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TierList {
    pub id: i32,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub content: String,
    pub votes: i32,
}

impl TierList {
    pub fn create(id: i32, entry: &NewEntry) -> Self {
        Self {
            id,
            title: entry.title.clone(),
            author: entry.author.clone(),
            content: entry.content.clone(),
            votes: 0,
        }
    }
}

/// Request body shared by the guide and tier list endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EntryRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl EntryRequest {
    pub fn validate(self) -> Result<NewEntry, CatalogError> {
        let title = self.title.filter(|t| !t.is_empty());
        let author = self.author.filter(|a| !a.is_empty());

        match (title, author) {
            (Some(title), Some(author)) => Ok(NewEntry {
                title,
                author,
                content: self.content.unwrap_or_default(),
            }),
            _ => Err(CatalogError::Validation("Title and author are required".into())),
        }
    }
}

/// A validated guide or tier list submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub title: String,
    pub author: String,
    pub content: String,
}

pub fn next_id(ids: impl Iterator<Item = i32>) -> i32 {
    ids.max().unwrap_or(0).max(0) + 1
}
