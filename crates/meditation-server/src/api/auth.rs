//! Registration and login handlers.

use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use meditation_types::{AuthResponse, LoginRequest, RegisterRequest};

use crate::auth::{
    hash_password_blocking, start_session, validate_login, validate_registration,
    verify_password_blocking,
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{InsertUser, NewUser};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or duplicate account", body = meditation_types::MessageResponse)
    )
)]
#[post("/api/auth/register")]
/// Create an account and return a bearer token.
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let registration = validate_registration(&body)?;
    let password_hash = hash_password_blocking(registration.password.clone()).await?;
    let id = uuid::Uuid::new_v4().to_string();
    let new_user = NewUser {
        id: &id,
        username: &registration.username,
        email: &registration.email,
        password_hash: &password_hash,
    };
    let user = match state.store.insert_user(&new_user, Utc::now())? {
        InsertUser::Created(user) => user,
        InsertUser::Duplicate => {
            tracing::info!(email = %registration.email, "registration rejected: duplicate");
            return Err(ApiError::Validation("User already exists".to_string()));
        }
    };
    let token = start_session(&state, &user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.summary(),
        message: "User registered successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid credentials", body = meditation_types::MessageResponse)
    )
)]
#[post("/api/auth/login")]
/// Exchange credentials for a bearer token.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = validate_login(&body)?;
    let user = state.store.user_by_email(&email)?;
    let stored = user.as_ref().map(|user| user.password_hash.clone());
    let matched = verify_password_blocking(body.password.clone(), stored).await?;
    let user = match user {
        Some(user) if matched => user,
        _ => {
            tracing::info!(email = %email, "login rejected");
            return Err(ApiError::Validation("Invalid credentials".to_string()));
        }
    };
    let token = start_session(&state, &user)?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.summary(),
        message: "Login successful".to_string(),
    }))
}
