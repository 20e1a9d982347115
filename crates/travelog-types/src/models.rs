use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of an account. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelStory {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub story: String,
    pub visited_location: String,
    pub is_favourite: bool,
    pub user_id: Uuid,
    pub image_url: String,
    pub visited_date: DateTime<Utc>,
    pub created_on: DateTime<Utc>,
}
