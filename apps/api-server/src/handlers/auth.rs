//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::User;
use quill_core::services::RegisterInput;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        created_at: user.created_at,
    }
}

fn roles_for(user: &User) -> Vec<String> {
    let mut roles = vec!["user".to_string()];
    if user.is_admin {
        roles.push("admin".to_string());
    }
    roles
}

fn auth_response(state: &AppState, user: &User, remember: bool) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, &user.email, roles_for(user), remember)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds(remember) as u64,
        user: user_response(user),
    })
}

/// POST /api/auth/register
///
/// Registration logs the new user straight in, so the response carries a
/// token alongside the profile.
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .identity
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(auth_response(&state, &user, false)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state.identity.authenticate(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(auth_response(&state, &user, req.remember)?))
}

/// GET /api/auth/me - the caller's profile, freshly loaded.
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    // A valid token for a user the store no longer knows is stale, not a 404.
    let user = state
        .identity
        .get_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
