use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use rand_core::OsRng;
use tracing::{error, info};

use travelog_types::api::{
    LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse, UserSummary,
};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::{AppState, run_blocking};

/// POST /create-account
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(full_name), Some(email), Some(password)) = (
        non_empty(req.full_name),
        non_empty(req.email),
        non_empty(req.password),
    ) else {
        return Err(ApiError::missing_fields());
    };

    let password_hash = run_blocking(move || hash_password(&password)).await?;

    // The unique index on email rejects duplicates in the same statement
    let app = state.clone();
    let row = run_blocking(move || Ok(app.db.create_user(&full_name, &email, &password_hash)?)).await?;
    let user = row.into_user()?;

    let access_token = state.tokens.issue(user.id).map_err(|e| {
        error!("Failed to issue token: {}", e);
        ApiError::Internal("Internal server error".into())
    })?;

    info!("Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            error: false,
            user: UserSummary {
                full_name: user.full_name,
                email: user.email,
            },
            access_token,
            message: "Registration Successful".into(),
        }),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(ApiError::Validation("Email and Password are required".into()));
    };

    let app = state.clone();
    let row = run_blocking(move || Ok(app.db.get_user_by_email(&email)?))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let stored_hash = row.password.clone();
    run_blocking(move || verify_password(&password, &stored_hash)).await?;

    let user = row.into_user()?;
    let access_token = state.tokens.issue(user.id).map_err(|e| {
        error!("Failed to issue token: {}", e);
        ApiError::Internal("Internal server error".into())
    })?;

    Ok(Json(LoginResponse {
        error: false,
        message: "Login Successful".into(),
        user: UserSummary {
            full_name: user.full_name,
            email: user.email,
        },
        access_token,
    }))
}

/// GET /get-user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let app = state.clone();
    let id = auth.user_id.to_string();
    let row = run_blocking(move || Ok(app.db.get_user_by_id(&id)?))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(ProfileResponse {
        user: row.into_user()?,
    }))
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// Argon2id with a random salt, encoded as a PHC string.
fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal("Internal server error".into())
        })
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        error!("Stored password hash is unreadable: {}", e);
        ApiError::Internal("Internal server error".into())
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let a = hash_password("pw12345").unwrap();
        let b = hash_password("pw12345").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));

        assert!(verify_password("pw12345", &a).is_ok());
        assert!(matches!(
            verify_password("wrong", &a),
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[test]
    fn empty_fields_count_as_missing() {
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }
}
