//! Conversion between catalog models and Firestore REST documents.
//!
//! Firestore wraps every field in a typed value (`{"stringValue": "..."}`,
//! `{"integerValue": "42"}`); integers travel as strings. Document ids are
//! the stringified numeric ids of the records.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::CatalogError;
use crate::models::{Game, Guide, TierList};

#[derive(Debug, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

impl Document {
    /// Numeric id taken from the last segment of the resource name.
    pub fn id(&self) -> Result<i32, CatalogError> {
        self.name
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
            .ok_or_else(|| {
                CatalogError::Unavailable(format!("unexpected document name: {}", self.name))
            })
    }

    fn string(&self, key: &str) -> String {
        self.fields
            .get(key)
            .and_then(|v| v.get("stringValue"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn malformed(&self, key: &str) -> CatalogError {
        CatalogError::Unavailable(format!("malformed {key} in document {}", self.name))
    }

    /// A missing integer field reads as zero; one that is present but not a
    /// whole number in `i32` range is an error.
    fn integer(&self, key: &str) -> Result<i32, CatalogError> {
        let Some(value) = self.fields.get(key) else {
            return Ok(0);
        };

        let whole = if let Some(raw) = value.get("integerValue") {
            match raw {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            }
        } else {
            value
                .get("doubleValue")
                .and_then(Value::as_f64)
                .filter(|d| d.fract() == 0.0 && d.abs() <= f64::from(i32::MAX))
                .map(|d| d as i64)
        };

        whole
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| self.malformed(key))
    }

    fn date(&self, key: &str) -> Result<NaiveDate, CatalogError> {
        self.string(key)
            .parse::<NaiveDate>()
            .map_err(|_| self.malformed(key))
    }

    pub fn to_game(&self) -> Result<Game, CatalogError> {
        Ok(Game {
            id: self.id()?,
            name: self.string("name"),
            description: self.string("description"),
            category: self.string("category"),
            publisher: self.string("publisher"),
            release_year: self.integer("releaseYear")?,
            popularity: self.integer("popularity")?,
            guides: Vec::new(),
            tier_lists: Vec::new(),
        })
    }

    pub fn to_guide(&self) -> Result<Guide, CatalogError> {
        Ok(Guide {
            id: self.id()?,
            title: self.string("title"),
            author: self.string("author"),
            content: self.string("content"),
            likes: self.integer("likes")?,
            date: self.date("date")?,
        })
    }

    pub fn to_tier_list(&self) -> Result<TierList, CatalogError> {
        Ok(TierList {
            id: self.id()?,
            title: self.string("title"),
            author: self.string("author"),
            content: self.string("content"),
            votes: self.integer("votes")?,
        })
    }
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn integer_value(value: i32) -> Value {
    json!({ "integerValue": value.to_string() })
}

/// Top-level game fields; guides and tier lists live in subcollections.
pub fn game_fields(game: &Game) -> Value {
    json!({
        "name": string_value(&game.name),
        "description": string_value(&game.description),
        "category": string_value(&game.category),
        "publisher": string_value(&game.publisher),
        "releaseYear": integer_value(game.release_year),
        "popularity": integer_value(game.popularity),
    })
}

pub fn guide_fields(guide: &Guide) -> Value {
    json!({
        "id": integer_value(guide.id),
        "title": string_value(&guide.title),
        "author": string_value(&guide.author),
        "content": string_value(&guide.content),
        "likes": integer_value(guide.likes),
        "date": string_value(&guide.date.format("%Y-%m-%d").to_string()),
    })
}

pub fn tier_list_fields(tier_list: &TierList) -> Value {
    json!({
        "id": integer_value(tier_list.id),
        "title": string_value(&tier_list.title),
        "author": string_value(&tier_list.author),
        "content": string_value(&tier_list.content),
        "votes": integer_value(tier_list.votes),
    })
}
