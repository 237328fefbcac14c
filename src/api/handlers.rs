use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{FiltersUpdate, ItemId},
    services::{ComparisonTable, Wizard},
};

use super::state::{session_not_found, Session};
use super::views::{FavoriteResponse, SessionView};
use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct SetQueryRequest {
    pub query: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Open a new wizard session on the welcome step
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let id = Uuid::new_v4();
    let wizard = Wizard::new();
    let view = SessionView::new(id, &wizard);

    state.evict_idle_sessions().await;

    let mut inner = state.inner.write().await;
    inner.sessions.insert(id, Session::new(wizard));
    tracing::info!(session_id = %id, sessions = inner.sessions.len(), "Session created");

    (StatusCode::CREATED, Json(view))
}

/// Current view of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, |_| Ok(())).await
}

/// Drop a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut inner = state.inner.write().await;
    inner
        .sessions
        .remove(&id)
        .ok_or_else(|| session_not_found(id))?;
    tracing::info!(session_id = %id, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// Welcome -> Query
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, Wizard::start).await
}

/// Query -> Welcome
pub async fn back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, Wizard::back).await
}

/// Update the query text
pub async fn set_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetQueryRequest>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, |wizard| wizard.set_query(request.query)).await
}

/// Fetch recommendations for the session's query
///
/// A failed fetch is reported in the view (`error`, step unchanged), not as an HTTP
/// error. The session lock is released while the backend request is in flight; the
/// `loading` flag rejects concurrent submissions. The fetch runs on its own task, so
/// the outcome is still applied and `loading` cleared when the client goes away.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<SessionView>> {
    let (ticket, query) = state.with_session(id, Wizard::begin_submit).await?;

    tracing::info!(
        session_id = %id,
        request_id = %request_id,
        source = state.recommender.name(),
        "Submitting query"
    );
    let fetch = tokio::spawn(async move {
        let outcome = state
            .recommender
            .fetch_recommendations(&query, request_id)
            .await;
        state
            .with_session(id, |wizard| {
                wizard.complete_submit(ticket, outcome);
                Ok(SessionView::new(id, wizard))
            })
            .await
    });

    let view = fetch
        .await
        .map_err(|e| AppError::Internal(format!("Submit task failed: {}", e)))??;
    Ok(Json(view))
}

/// Results -> Welcome with a full reset
pub async fn new_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, Wizard::new_search).await
}

/// Partially update search text, type tab, job level and sort
pub async fn update_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FiltersUpdate>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, |wizard| wizard.update_filters(update)).await
}

/// Reset search text, type tab and job level
pub async fn clear_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, Wizard::clear_filters).await
}

/// Expand or collapse a result card
pub async fn toggle_expanded(
    State(state): State<AppState>,
    Path((id, item)): Path<(Uuid, usize)>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, |wizard| wizard.toggle_expanded(ItemId(item)).map(|_| ())).await
}

/// Add a result to, or remove it from, the comparison
pub async fn toggle_comparison(
    State(state): State<AppState>,
    Path((id, item)): Path<(Uuid, usize)>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, |wizard| {
        wizard.toggle_comparison(ItemId(item)).map(|_| ())
    })
    .await
}

/// Add a result to, or remove it from, the favorites
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path((id, item)): Path<(Uuid, usize)>,
) -> AppResult<Json<FavoriteResponse>> {
    let item = ItemId(item);
    state
        .with_session(id, |wizard| {
            let notification = wizard.toggle_favorite(item)?;
            Ok(Json(FavoriteResponse {
                favorite: wizard.is_favorite(item),
                notification,
                session: SessionView::new(id, wizard),
            }))
        })
        .await
}

/// Show or hide the comparison panel
pub async fn toggle_comparison_panel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    transition(&state, id, |wizard| wizard.toggle_comparison_panel().map(|_| ())).await
}

/// Comparison table of the selected results
pub async fn get_comparison(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ComparisonTable>> {
    state
        .with_session(id, |wizard| {
            wizard.selected_comparison().map(Json).ok_or_else(|| {
                AppError::NotFound("Select at least 2 assessments to compare".to_string())
            })
        })
        .await
}

/// Applies `f` to a session and returns the resulting view
async fn transition(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut Wizard) -> AppResult<()>,
) -> AppResult<Json<SessionView>> {
    state
        .with_session(id, |wizard| {
            f(wizard)?;
            Ok(Json(SessionView::new(id, wizard)))
        })
        .await
}
