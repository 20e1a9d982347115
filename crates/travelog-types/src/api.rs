use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{TravelStory, User};

// -- Token claims --

/// Payload carried by every access token. Shared by the issuing handlers and
/// the auth gate so both sides agree on the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

// -- Errors --

/// Envelope for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
}

// -- Auth --

// Fields are optional so a missing field reaches the handler and gets the
// same "required" message as an empty one.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub error: bool,
    pub user: UserSummary,
    pub access_token: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub error: bool,
    pub message: String,
    pub user: UserSummary,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

// -- Images --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteImageQuery {
    pub image_url: Option<String>,
}

/// `error` is omitted on success so the body is just `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    pub message: String,
}

// -- Stories --

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddStoryRequest {
    pub title: Option<String>,
    pub story: Option<String>,
    pub visited_location: Option<String>,
    pub image_url: Option<String>,
    /// Milliseconds since the Unix epoch, as a JSON number or a numeric string.
    pub visited_date: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story: TravelStory,
    pub message: String,
}
