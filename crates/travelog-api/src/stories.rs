use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::info;

use travelog_db::models::NewStory;
use travelog_types::api::{AddStoryRequest, StoryResponse};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::{AppState, run_blocking};

/// POST /add-travel-story. The story is always owned by the caller.
pub async fn add_travel_story(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(req), _): WithRejection<Json<AddStoryRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let filled = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(title), Some(story), Some(visited_location), Some(image_url), Some(visited_date)) = (
        filled(req.title),
        filled(req.story),
        filled(req.visited_location),
        filled(req.image_url),
        req.visited_date.filter(|v| !is_blank(v)),
    ) else {
        return Err(ApiError::missing_fields());
    };

    let visited_date_ms = parse_visited_date(&visited_date).ok_or_else(|| {
        ApiError::Validation("visitedDate must be a timestamp in milliseconds".into())
    })?;

    let new = NewStory {
        title,
        story,
        visited_location,
        image_url,
        user_id: auth.user_id,
        visited_date_ms,
    };

    let app = state.clone();
    let row = run_blocking(move || Ok(app.db.create_story(new)?)).await?;
    let story = row.into_story()?;

    info!("User {} added story {}", auth.user_id, story.id);
    Ok((
        StatusCode::CREATED,
        Json(StoryResponse {
            story,
            message: "Added Successfully".into(),
        }),
    ))
}

/// Values a client uses to leave a field unset: null, "", 0 or false.
fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Accepts a JSON integer, a float (truncated), or a string of digits.
fn parse_visited_date(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visited_date_forms() {
        assert_eq!(parse_visited_date(&json!(1_700_000_000_000i64)), Some(1_700_000_000_000));
        assert_eq!(parse_visited_date(&json!(1_700_000_000_000.9)), Some(1_700_000_000_000));
        assert_eq!(parse_visited_date(&json!("1700000000000")), Some(1_700_000_000_000));
        assert_eq!(parse_visited_date(&json!(" 42 ")), Some(42));
    }

    #[test]
    fn visited_date_rejects_non_numeric() {
        assert_eq!(parse_visited_date(&json!("yesterday")), None);
        assert_eq!(parse_visited_date(&json!("12abc")), None);
        assert_eq!(parse_visited_date(&json!(true)), None);
        assert_eq!(parse_visited_date(&json!([1, 2])), None);
        assert_eq!(parse_visited_date(&json!({"ms": 1})), None);
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!(0)));
        assert!(is_blank(&json!(0.0)));
        assert!(is_blank(&json!(false)));
        assert!(!is_blank(&json!(1)));
        assert!(!is_blank(&json!("0")));
        assert!(!is_blank(&json!(true)));
    }
}
