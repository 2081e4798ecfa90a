use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::content::edit_mode::{EditContext, EditStatus};
use crate::content::records::{FieldValue, SkillCategory, SkillSeed};
use crate::content::view::{render_section, MutationView, SectionView};
use crate::content::Section;
use crate::errors::AppError;
use crate::state::AppState;

/// Proof that the request carries the owner's bearer token.
pub struct Owner;

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;
        let expected = state.config.owner_token.trim();
        // A blank configured token must never match a blank bearer.
        if token.is_empty() || expected.is_empty() || token != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(Owner)
    }
}

fn require_edit_mode(state: &AppState) -> Result<(), AppError> {
    if state.session.is_edit_mode() {
        Ok(())
    } else {
        Err(AppError::EditModeDisabled)
    }
}

/// Parses an optional JSON body: empty means "use defaults".
fn optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Edit session
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct NoticesResponse {
    pub notices: Vec<String>,
}

/// GET /api/v1/edit
pub async fn handle_edit_status(State(state): State<AppState>) -> Json<EditStatus> {
    Json(state.session.status())
}

/// POST /api/v1/edit/toggle
pub async fn handle_toggle_edit(
    State(state): State<AppState>,
    _owner: Owner,
    Json(req): Json<ToggleRequest>,
) -> Json<EditStatus> {
    state.session.set_edit_mode(req.enabled);
    Json(state.session.status())
}

/// POST /api/v1/edit/acknowledge
pub async fn handle_acknowledge(State(state): State<AppState>, _owner: Owner) -> Json<EditStatus> {
    state.session.set_has_unsaved_changes(false);
    Json(state.session.status())
}

/// GET /api/v1/edit/notices
pub async fn handle_drain_notices(
    State(state): State<AppState>,
    _owner: Owner,
) -> Json<NoticesResponse> {
    Json(NoticesResponse {
        notices: state.session.drain_notices(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Sections (generic over the record type)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    pub value: FieldValue,
}

/// GET /api/v1/sections/<section>
pub async fn handle_get_section<R: Section>(State(state): State<AppState>) -> Json<SectionView<R>> {
    let store = R::store(&state.portfolio).lock().await;
    Json(render_section(&store, state.session.as_ref()))
}

/// POST /api/v1/sections/<section>
pub async fn handle_add<R: Section>(
    State(state): State<AppState>,
    _owner: Owner,
    body: Bytes,
) -> Result<(StatusCode, Json<MutationView<R>>), AppError> {
    require_edit_mode(&state)?;
    let seed = optional_json::<R::Seed>(&body)?;
    let ctx = state.session.as_ref();

    let mut store = R::store(&state.portfolio).lock().await;
    let (id, outcome) = store.add(seed, ctx).await?;
    Ok((
        StatusCode::CREATED,
        Json(MutationView::new(&store, ctx, Some(id), true, outcome)),
    ))
}

/// PATCH /api/v1/sections/<section>/:id
pub async fn handle_update_field<R: Section>(
    State(state): State<AppState>,
    _owner: Owner,
    Path(id): Path<String>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<MutationView<R>>, AppError> {
    require_edit_mode(&state)?;
    let ctx = state.session.as_ref();

    let mut store = R::store(&state.portfolio).lock().await;
    let (updated, outcome) = store.update_field(&id, &req.field, req.value, ctx).await?;
    Ok(Json(MutationView::new(&store, ctx, Some(id), updated, outcome)))
}

/// DELETE /api/v1/sections/<section>/:id
pub async fn handle_delete<R: Section>(
    State(state): State<AppState>,
    _owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<MutationView<R>>, AppError> {
    require_edit_mode(&state)?;
    let ctx = state.session.as_ref();

    let mut store = R::store(&state.portfolio).lock().await;
    let (removed, outcome) = store.delete(&id, ctx).await?;
    Ok(Json(MutationView::new(&store, ctx, Some(id), removed, outcome)))
}

/// POST /api/v1/sections/<section>/reset
pub async fn handle_reset<R: Section>(
    State(state): State<AppState>,
    _owner: Owner,
) -> Result<Json<MutationView<R>>, AppError> {
    require_edit_mode(&state)?;
    let ctx = state.session.as_ref();

    let mut store = R::store(&state.portfolio).lock().await;
    let outcome = store.reset(ctx).await?;
    Ok(Json(MutationView::new(&store, ctx, None, true, outcome)))
}

// ────────────────────────────────────────────────────────────────────────────
// Nested skills
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sections/skills/:id/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    _owner: Owner,
    Path(category_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<MutationView<SkillCategory>>), AppError> {
    require_edit_mode(&state)?;
    let seed = optional_json::<SkillSeed>(&body)?;
    let ctx = state.session.as_ref();

    let mut store = state.portfolio.skill_categories.lock().await;
    let (skill_id, outcome) = store.add_skill(&category_id, seed, ctx).await?;
    let status = if skill_id.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let changed = skill_id.is_some();
    Ok((
        status,
        Json(MutationView::new(&store, ctx, skill_id, changed, outcome)),
    ))
}

/// PATCH /api/v1/sections/skills/:id/skills/:skill_id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    _owner: Owner,
    Path((category_id, skill_id)): Path<(String, String)>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<MutationView<SkillCategory>>, AppError> {
    require_edit_mode(&state)?;
    let ctx = state.session.as_ref();

    let mut store = state.portfolio.skill_categories.lock().await;
    let (updated, outcome) = store
        .update_skill_field(&category_id, &skill_id, &req.field, req.value, ctx)
        .await?;
    Ok(Json(MutationView::new(&store, ctx, Some(skill_id), updated, outcome)))
}

/// DELETE /api/v1/sections/skills/:id/skills/:skill_id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    _owner: Owner,
    Path((category_id, skill_id)): Path<(String, String)>,
) -> Result<Json<MutationView<SkillCategory>>, AppError> {
    require_edit_mode(&state)?;
    let ctx = state.session.as_ref();

    let mut store = state.portfolio.skill_categories.lock().await;
    let (removed, outcome) = store.delete_skill(&category_id, &skill_id, ctx).await?;
    Ok(Json(MutationView::new(&store, ctx, Some(skill_id), removed, outcome)))
}
