use anyhow::Context;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;
use uuid::Uuid;

use wellness_db::{format_timestamp, is_unique_violation};
use wellness_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use wellness_types::models::UserProfile;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::users::user_profile;
use crate::{AppState, AuthConfig, run_blocking};

const MAX_USERNAME_LEN: usize = 32;

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    // Validate input
    if username.is_empty() {
        return Err(ApiError::invalid_field("username", "Username is required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::invalid_field(
            "username",
            format!("Username must be at most {MAX_USERNAME_LEN} characters"),
        ));
    }
    if email.is_empty() {
        return Err(ApiError::invalid_field("email", "Email is required"));
    }
    if !email.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(ApiError::invalid_field("email", "Email is not valid"));
    }
    if req.password.is_empty() {
        return Err(ApiError::invalid_field("password", "Password is required"));
    }

    // Check for taken username/email up front for a precise message; the
    // UNIQUE constraints below still catch concurrent registrations.
    let (u, e) = (username.clone(), email.clone());
    let (username_taken, email_taken) = run_blocking(&state, move |db| {
        Ok((
            db.get_user_by_username(&u)?.is_some(),
            db.get_user_by_email(&e)?.is_some(),
        ))
    })
    .await?;
    if username_taken {
        return Err(ApiError::Conflict("Username already exists".into()));
    }
    if email_taken {
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    let password = req.password;
    let password_hash = cpu_bound(move || hash_password(&password)).await?;

    let user_id = Uuid::new_v4();
    let id = user_id.to_string();
    let name = username.clone();
    let created_at = format_timestamp(Utc::now());

    match run_blocking(&state, move |db| {
        db.create_user(&id, &name, &email, &password_hash, &created_at)
    })
    .await
    {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict("Username or email already exists".into()));
        }
        Err(e) => return Err(e.into()),
    }

    info!(%user_id, %username, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".into(),
            user_id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim().to_string();
    let user = run_blocking(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    let (password, stored) = (req.password, user.password.clone());
    let valid = cpu_bound(move || verify_password(&password, &stored))
        .await
        .with_context(|| format!("Checking password for user {}", user.id))?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let profile = user_profile(user)?;
    let token = create_token(&state.auth, profile.id, &profile.username)?;

    Ok(Json(LoginResponse {
        token,
        user: profile.into(),
    }))
}

pub async fn me(Extension(user): Extension<UserProfile>) -> Json<UserProfile> {
    Json(user)
}

/// Argon2 work runs on the blocking pool, away from the async workers.
async fn cpu_bound<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("hashing task failed: {}", e))?
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; errors only for an unparseable stored hash.
fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("Corrupt password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_token(auth: &AuthConfig, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (Utc::now() + auth.token_ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}
