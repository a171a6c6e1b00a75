use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CompanyUpdate, Role, UpdateStatus};

// -- JWT Claims --

/// Session claims. The company and role are fixed at login, so every request
/// carries the caller's active company and role explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub company_id: Uuid,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub company_id: Uuid,
    pub role: Role,
    pub token: String,
}

// -- Company updates --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Mark the update as sent right away instead of saving a draft.
    #[serde(default)]
    pub send: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyUpdateResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: UpdateStatus,
    pub created_at: DateTime<Utc>,
}

impl From<CompanyUpdate> for CompanyUpdateResponse {
    fn from(update: CompanyUpdate) -> Self {
        Self {
            status: update.status(),
            summary: update.summary(),
            id: update.id,
            company_id: update.company_id,
            title: update.title,
            body: update.body,
            sent_at: update.sent_at,
            created_at: update.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateListResponse {
    pub updates: Vec<CompanyUpdateResponse>,
}
