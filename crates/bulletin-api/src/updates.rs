use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use bulletin_db::models::format_timestamp;
use bulletin_types::api::{
    Claims, CompanyUpdateResponse, CreateUpdateRequest, UpdateListResponse,
};
use bulletin_types::models::CompanyUpdate;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

const MAX_TITLE_LEN: usize = 200;

/// Callers only ever see their active company.
fn authorize_company(claims: &Claims, company_id: Uuid) -> Result<(), ApiError> {
    if claims.company_id == company_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub(crate) fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.role.is_administrator() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Fetch a company's updates, newest first. Rows that fail to decode are
/// logged and skipped.
pub(crate) async fn load_updates(
    state: &AppState,
    company_id: Uuid,
) -> Result<Vec<CompanyUpdate>, ApiError> {
    let cid = company_id.to_string();
    let rows = blocking(state, move |db| db.list_updates(&cid)).await?;

    let updates = rows
        .into_iter()
        .filter_map(|row| {
            row.into_model()
                .map_err(|e| warn!("Skipping corrupt update row: {:#}", e))
                .ok()
        })
        .collect();

    Ok(updates)
}

pub(crate) async fn load_update(
    state: &AppState,
    company_id: Uuid,
    id: Uuid,
) -> Result<CompanyUpdate, ApiError> {
    let cid = company_id.to_string();
    let uid = id.to_string();
    let row = blocking(state, move |db| db.get_update(&cid, &uid))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(row.into_model()?)
}

/// Delete an update of the caller's company. `Ok(false)` means it was already
/// gone.
pub(crate) async fn remove_update(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> Result<bool, ApiError> {
    require_admin(claims)?;

    let cid = claims.company_id.to_string();
    let uid = id.to_string();
    let deleted = blocking(state, move |db| db.delete_update(&cid, &uid)).await?;

    if deleted {
        info!("{} deleted update {} in company {}", claims.username, id, claims.company_id);
    }
    Ok(deleted)
}

/// GET /api/companies/{company_id}/updates
pub async fn list_updates(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UpdateListResponse>, ApiError> {
    authorize_company(&claims, company_id)?;

    let updates = load_updates(&state, company_id).await?;

    Ok(Json(UpdateListResponse {
        updates: updates.into_iter().map(CompanyUpdateResponse::from).collect(),
    }))
}

/// GET /api/companies/{company_id}/updates/{id}
pub async fn get_update(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<CompanyUpdateResponse>, ApiError> {
    authorize_company(&claims, company_id)?;

    let update = load_update(&state, company_id, id).await?;
    Ok(Json(update.into()))
}

/// POST /api/companies/{company_id}/updates
pub async fn create_update(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_company(&claims, company_id)?;
    require_admin(&claims)?;

    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::BadRequest(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }

    let now = Utc::now();
    let update = CompanyUpdate {
        id: Uuid::new_v4(),
        company_id,
        title,
        body: req.body,
        sent_at: req.send.then_some(now),
        created_at: now,
    };

    let id = update.id.to_string();
    let cid = company_id.to_string();
    let title = update.title.clone();
    let body = update.body.clone();
    let sent_at = update.sent_at.map(format_timestamp);
    let created_at = format_timestamp(now);
    blocking(&state, move |db| {
        db.insert_update(&id, &cid, &title, &body, sent_at.as_deref(), &created_at)
    })
    .await?;

    info!("{} created update {} in company {}", claims.username, update.id, company_id);

    Ok((StatusCode::CREATED, Json(CompanyUpdateResponse::from(update))))
}

/// DELETE /api/companies/{company_id}/updates/{id}
pub async fn delete_update(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    authorize_company(&claims, company_id)?;

    if remove_update(&state, &claims, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
