use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::lifecycle::{parse_resume_id, AttachedFile, ResumeError, UploadedFile};
use crate::state::AppState;
use crate::utils::json::Envelope;

const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct AttachQuery {
    pub resume_id: Option<String>,
}

pub async fn attach_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AttachQuery>,
    multipart: Option<Multipart>,
) -> AppResult<(StatusCode, Json<Envelope<Vec<AttachedFile>>>)> {
    let resume_id = match query.resume_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            Uuid::parse_str(raw).map_err(|_| AppError::bad_request("INVALID_RESUME_ID"))?,
        ),
        _ => None,
    };

    let files = match multipart {
        Some(multipart) => read_files(multipart).await?,
        None => Vec::new(),
    };
    let count = files.len();

    let attached = state.resumes.attach_files(&user, resume_id, files).await?;
    info!(user_id = %user.user_id, files = count, "resume upload finished");

    Ok((StatusCode::CREATED, Json(Envelope::with_result(attached))))
}

pub async fn delete_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resume_id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    let resume_id = parse_resume_id(&resume_id).map_err(|_| AppError::invalid_resume())?;
    state
        .resumes
        .delete_file(&user, resume_id)
        .await
        .map_err(|err| match err {
            ResumeError::NotFound => AppError::invalid_resume(),
            other => other.into(),
        })?;

    Ok(Json(Envelope::success()))
}

async fn read_files(mut multipart: Multipart) -> AppResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::bad_request("INVALID_MULTIPART")
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Plain form values under the file field carry no filename.
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|err| {
            error!(error = %err, file_name = %name, "failed to read file bytes");
            AppError::bad_request("INVALID_MULTIPART")
        })?;

        files.push(UploadedFile {
            name,
            content_type,
            bytes,
        });
    }

    Ok(files)
}
