//! Story store.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewStory, StoryRow};
use crate::{Database, DbError, Result};

impl Database {
    /// Validate and insert a travel story. Rows keep insertion order via `seq`.
    pub fn create_story(&self, new: NewStory) -> Result<StoryRow> {
        validate(&new)?;

        let row = StoryRow {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            story: new.story,
            visited_location: new.visited_location,
            is_favourite: false,
            user_id: new.user_id.to_string(),
            image_url: new.image_url,
            visited_date: new.visited_date_ms,
            created_on: Utc::now().timestamp_millis(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO travel_stories
                    (id, title, story, visited_location, is_favourite, user_id, image_url, visited_date, created_on)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    row.id,
                    row.title,
                    row.story,
                    row.visited_location,
                    row.is_favourite,
                    row.user_id,
                    row.image_url,
                    row.visited_date,
                    row.created_on,
                ],
            )?;
            Ok(())
        })?;

        Ok(row)
    }
}

fn validate(new: &NewStory) -> Result<()> {
    let required = [
        ("title", &new.title),
        ("story", &new.story),
        ("visitedLocation", &new.visited_location),
        ("imageUrl", &new.image_url),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(DbError::Validation(format!(
            "TravelStory validation failed: {} required",
            missing.join(", ")
        )));
    }

    if DateTime::<Utc>::from_timestamp_millis(new.visited_date_ms).is_none() {
        return Err(DbError::Validation(format!(
            "TravelStory validation failed: visitedDate {} is not a valid date",
            new.visited_date_ms
        )));
    }

    Ok(())
}
