use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::lifecycle::{
    parse_json, parse_resume_id, ApplyPayload, ResumeDetail, ResumePayload, ResumeSummary,
};
use crate::state::AppState;
use crate::utils::json::Envelope;

#[derive(Serialize)]
pub struct CreatedResume {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct RecordedApply {
    pub id: Uuid,
}

pub async fn list_resumes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Envelope<Vec<ResumeSummary>>>> {
    let resumes = state.resumes.list(&user).await?;
    Ok(Json(Envelope::with_result(resumes)))
}

pub async fn create_resume(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> AppResult<Json<Envelope<CreatedResume>>> {
    let payload = ResumePayload::parse(&body)?;
    let id = state.resumes.create(&user, payload).await?;
    Ok(Json(Envelope::with_result(CreatedResume { id })))
}

pub async fn get_resume(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resume_id): Path<String>,
) -> AppResult<Json<Envelope<ResumeDetail>>> {
    let resume_id = parse_resume_id(&resume_id)?;
    let detail = state.resumes.get(&user, resume_id).await?;
    Ok(Json(Envelope::with_result(detail)))
}

pub async fn update_resume(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resume_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Envelope<()>>> {
    let body = parse_json(&body)?;
    let resume_id = parse_resume_id(&resume_id)?;
    state.resumes.update(&user, resume_id, body).await?;
    Ok(Json(Envelope::success()))
}

pub async fn delete_resume(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resume_id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    let resume_id = parse_resume_id(&resume_id)?;
    state.resumes.delete(&user, resume_id).await?;
    Ok(Json(Envelope::success()))
}

pub async fn apply_resume(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Envelope<RecordedApply>>)> {
    let payload = ApplyPayload::parse(&body)?;
    let id = state.resumes.apply(&user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_result(RecordedApply { id })),
    ))
}
