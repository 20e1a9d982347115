//! Database row types: these map directly to SQLite rows.
//! Converted to the public travelog-types models with `into_user` / `into_story`.

use chrono::{DateTime, Utc};
use travelog_types::models::{TravelStory, User};
use uuid::Uuid;

use crate::{DbError, Result};

#[derive(Debug)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub created_on: i64,
}

pub struct StoryRow {
    pub id: String,
    pub title: String,
    pub story: String,
    pub visited_location: String,
    pub is_favourite: bool,
    pub user_id: String,
    pub image_url: String,
    pub visited_date: i64,
    pub created_on: i64,
}

/// Caller-supplied fields for a new travel story.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub title: String,
    pub story: String,
    pub visited_location: String,
    pub image_url: String,
    pub user_id: Uuid,
    /// Milliseconds since the Unix epoch.
    pub visited_date_ms: i64,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_id(&self.id)?,
            full_name: self.full_name,
            email: self.email,
            created_on: millis_to_datetime(self.created_on)?,
        })
    }
}

impl StoryRow {
    pub fn into_story(self) -> Result<TravelStory> {
        Ok(TravelStory {
            id: parse_id(&self.id)?,
            user_id: parse_id(&self.user_id)?,
            title: self.title,
            story: self.story,
            visited_location: self.visited_location,
            is_favourite: self.is_favourite,
            image_url: self.image_url,
            visited_date: millis_to_datetime(self.visited_date)?,
            created_on: millis_to_datetime(self.created_on)?,
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| DbError::Corrupt(format!("bad id '{}': {}", raw, e)))
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DbError::Corrupt(format!("timestamp out of range: {}", ms)))
}
