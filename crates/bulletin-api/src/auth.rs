use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use bulletin_db::Database;
use bulletin_types::api::{Claims, LoginRequest, LoginResponse};
use bulletin_types::models::Role;

use crate::blocking;
use crate::error::ApiError;

/// Cookie carrying the session token for browser page loads.
pub const SESSION_COOKIE: &str = "bulletin_token";

const TOKEN_LIFETIME_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let username = req.username.clone();
    let user = blocking(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("Stored password hash unreadable: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user = user.into_model()?;

    let user_id = user.id.to_string();
    let company_id = req.company_id.map(|id| id.to_string());
    let membership = blocking(&state, move |db| {
        db.get_membership(&user_id, company_id.as_deref())
    })
    .await?
    .ok_or(ApiError::Forbidden)?;

    let role = membership.role()?;
    let company_id: Uuid = membership
        .company_id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt company_id '{}': {}", membership.company_id, e))?;

    let token = create_token(&state.jwt_secret, user.id, &user.username, company_id, role)?;

    info!("{} signed in to company {} as {}", user.username, company_id, role);

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user_id: user.id,
            username: user.username,
            company_id,
            role,
            token,
        }),
    ))
}

pub fn create_token(
    secret: &str,
    user_id: Uuid,
    username: &str,
    company_id: Uuid,
    role: Role,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        company_id,
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Create a user with an Argon2id password hash and attach it to a company.
pub fn register_member(
    db: &Database,
    company_id: Uuid,
    username: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if username.len() < 3 || username.len() > 32 {
        anyhow::bail!("Username must be 3-32 characters");
    }
    if password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let user_id = Uuid::new_v4();
    let password_hash = hash_password(password)?;

    db.create_user(&user_id.to_string(), username, &password_hash)?;
    db.add_member(&company_id.to_string(), &user_id.to_string(), role.as_str())?;

    info!("Registered {} in company {} as {}", username, company_id, role);
    Ok(user_id)
}
