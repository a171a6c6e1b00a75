use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use bulletin_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::render;
use crate::updates::{load_update, load_updates, remove_update};
use crate::views::{Deleting, LIST_PATH, UpdateListPage};

const DELETE_FAILED: &str = "Something went wrong. Please try again.";

/// HTML flavour of [`ApiError`].
pub struct PageError(ApiError);

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let title = status.canonical_reason().unwrap_or("Error");
        let html = render::error_page(title, &self.0.public_message());
        (status, Html(html)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Open the delete dialog for this update.
    pub delete: Option<Uuid>,
}

/// GET /updates/company
pub async fn list_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, PageError> {
    let updates = load_updates(&state, claims.company_id).await?;
    let page = UpdateListPage::build(claims.role, updates, query.delete.map(Deleting::prompt));
    Ok(Html(render::list_page(&page)))
}

/// GET /updates/company/{id}
pub async fn detail_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Html<String>, PageError> {
    let update = load_update(&state, claims.company_id, id).await?;
    Ok(Html(render::detail_page(&update)))
}

/// POST /updates/company/{id}/delete
///
/// On success the browser is sent back to the list, which queries the
/// database again. On failure the list is re-rendered with the dialog still
/// open on the same row.
pub async fn delete_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, PageError> {
    match remove_update(&state, &claims, id).await {
        // Already gone counts as done
        Ok(_) => Ok(Redirect::to(LIST_PATH).into_response()),
        Err(ApiError::Internal(e)) => {
            error!("Deleting update {} failed: {:#}", id, e);
            let updates = load_updates(&state, claims.company_id).await?;
            let page = UpdateListPage::build(
                claims.role,
                updates,
                Some(Deleting::failed(id, DELETE_FAILED)),
            );
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(render::list_page(&page))).into_response())
        }
        Err(other) => Err(other.into()),
    }
}
