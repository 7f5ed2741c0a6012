//! Resume lifecycle rules.
//!
//! A resume has one of two shapes for its whole life:
//!
//! * content-based: authored through create/update, `is_file = false`,
//!   `content` populated, no storage key;
//! * file-based: created by the first file upload, `is_file = true`,
//!   `file_uuid` set once and reused by every later upload, no `content`.
//!
//! Operations that would mix the shapes fail with [`ResumeError::KindMismatch`].
//! Every lookup is scoped by owner, so a foreign resume reads as missing.

pub mod payload;

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::models::{NewResume, Resume, ResumeChanges};
use crate::storage::ObjectStorage;
use crate::store::{ResumeStore, StoreError};

pub use payload::{parse_json, ApplyPayload, ResumeContent, ResumePayload, UploadedFile};

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("missing or invalid field: {0}")]
    Validation(String),
    #[error("request body is not valid JSON: {0}")]
    Malformed(String),
    #[error("resume not found")]
    NotFound,
    #[error("request carries no file")]
    NoFile,
    #[error("operation does not apply to this kind of resume")]
    KindMismatch,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("object storage error: {0:#}")]
    Storage(anyhow::Error),
}

pub type ResumeResult<T> = Result<T, ResumeError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub title: String,
    pub is_done: bool,
    pub is_file: bool,
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDetail {
    pub id: Uuid,
    pub title: String,
    pub is_done: bool,
    pub is_file: bool,
    pub file_url: String,
    pub file_uuid: Option<String>,
    pub content: Option<Value>,
    pub user: OwnerInfo,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub id: Uuid,
    pub title: String,
    pub file_url: String,
}

impl From<Resume> for ResumeSummary {
    fn from(resume: Resume) -> Self {
        Self {
            id: resume.id,
            title: resume.title,
            is_done: resume.is_done,
            is_file: resume.is_file,
            file_url: resume.file_url,
        }
    }
}

#[derive(Clone)]
pub struct ResumeLifecycle {
    store: Arc<dyn ResumeStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl ResumeLifecycle {
    pub fn new(store: Arc<dyn ResumeStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { store, storage }
    }

    pub async fn list(&self, owner: &AuthenticatedUser) -> ResumeResult<Vec<ResumeSummary>> {
        let resumes = self.store.list_resumes(owner.user_id).await?;
        Ok(resumes.into_iter().map(ResumeSummary::from).collect())
    }

    pub async fn create(
        &self,
        owner: &AuthenticatedUser,
        payload: ResumePayload,
    ) -> ResumeResult<Uuid> {
        let new_resume = NewResume::content_based(
            owner.user_id,
            payload.title,
            payload.is_done,
            payload.content.into_value(),
        );
        let created = self.store.insert_resume(new_resume).await?;
        info!(resume_id = %created.id, user_id = %owner.user_id, "resume created");
        Ok(created.id)
    }

    pub async fn get(
        &self,
        owner: &AuthenticatedUser,
        resume_id: Uuid,
    ) -> ResumeResult<ResumeDetail> {
        let resume = self.owned(owner, resume_id).await?;
        Ok(ResumeDetail {
            id: resume.id,
            title: resume.title,
            is_done: resume.is_done,
            is_file: resume.is_file,
            file_url: resume.file_url,
            file_uuid: resume.file_uuid,
            content: resume.content,
            user: OwnerInfo {
                name: owner.name.clone(),
                email: owner.email.clone(),
            },
            created_at: resume.created_at,
            updated_at: resume.updated_at,
        })
    }

    /// Overwrites title, completion flag and content of a content-based resume.
    ///
    /// `body` is the decoded JSON request body. Its keys are read only after
    /// the resume is found, so an unknown or foreign id reports `NotFound`
    /// even when keys are missing.
    pub async fn update(
        &self,
        owner: &AuthenticatedUser,
        resume_id: Uuid,
        body: Value,
    ) -> ResumeResult<()> {
        let existing = self.owned(owner, resume_id).await?;
        let payload = ResumePayload::from_value(body)?;
        if existing.is_file {
            warn!(%resume_id, "refusing to write content into a file-based resume");
            return Err(ResumeError::KindMismatch);
        }

        let changes = ResumeChanges {
            title: Some(payload.title),
            is_done: Some(payload.is_done),
            content: Some(payload.content.into_value()),
            file_url: None,
            updated_at: now(),
        };
        self.store
            .update_resume(resume_id, owner.user_id, changes)
            .await?
            .ok_or(ResumeError::NotFound)?;

        info!(%resume_id, user_id = %owner.user_id, "resume updated");
        Ok(())
    }

    /// Removes the record only. An attached blob stays in storage until
    /// [`ResumeLifecycle::delete_file`] is called for it.
    pub async fn delete(&self, owner: &AuthenticatedUser, resume_id: Uuid) -> ResumeResult<()> {
        if !self.store.delete_resume(resume_id, owner.user_id).await? {
            return Err(ResumeError::NotFound);
        }
        info!(%resume_id, user_id = %owner.user_id, "resume deleted");
        Ok(())
    }

    /// Records an application to a job posting with the given resume.
    ///
    /// The resume is not checked against the caller; only its existence is
    /// enforced by the store.
    pub async fn apply(
        &self,
        owner: &AuthenticatedUser,
        payload: ApplyPayload,
    ) -> ResumeResult<Uuid> {
        let (apply, _) = self
            .store
            .create_application(owner.user_id, payload.resume_id, payload.job_posting_id)
            .await
            .map_err(|err| match err {
                StoreError::MissingReference => ResumeError::NotFound,
                other => ResumeError::Store(other),
            })?;

        info!(
            apply_id = %apply.id,
            resume_id = %payload.resume_id,
            job_posting_id = %payload.job_posting_id,
            user_id = %owner.user_id,
            "application recorded"
        );
        Ok(apply.id)
    }

    /// Uploads each file into a file-based resume.
    ///
    /// With `resume_id` set, every file lands in that resume (created on first
    /// use) and overwrites the same storage key. Without it, each file gets a
    /// resume of its own. Files are handled in order and nothing is rolled
    /// back: if a later file fails, earlier files stay attached.
    pub async fn attach_files(
        &self,
        owner: &AuthenticatedUser,
        resume_id: Option<Uuid>,
        files: Vec<UploadedFile>,
    ) -> ResumeResult<Vec<AttachedFile>> {
        if files.is_empty() {
            return Err(ResumeError::NoFile);
        }

        let mut attached = Vec::with_capacity(files.len());
        for file in files {
            let resume = self.file_resume(owner, resume_id).await?;
            let key = resume.file_uuid.clone().ok_or(ResumeError::KindMismatch)?;
            let size = file.bytes.len();

            self.storage
                .put_object(&key, file.bytes, file.content_type)
                .await
                .map_err(ResumeError::Storage)?;

            let changes = ResumeChanges {
                title: Some(file.name),
                is_done: None,
                content: None,
                file_url: Some(self.storage.object_url(&key)),
                updated_at: now(),
            };
            let updated = self
                .store
                .update_resume(resume.id, owner.user_id, changes)
                .await?
                .ok_or(ResumeError::NotFound)?;

            info!(
                resume_id = %updated.id,
                file_uuid = %key,
                size,
                "resume file attached"
            );
            attached.push(AttachedFile {
                id: updated.id,
                title: updated.title,
                file_url: updated.file_url,
            });
        }

        Ok(attached)
    }

    /// Deletes the stored blob. The record, including its now dangling
    /// `file_url`, is left in place.
    pub async fn delete_file(
        &self,
        owner: &AuthenticatedUser,
        resume_id: Uuid,
    ) -> ResumeResult<()> {
        let resume = self.owned(owner, resume_id).await?;
        let key = resume.file_uuid.ok_or(ResumeError::KindMismatch)?;

        self.storage
            .delete_object(&key)
            .await
            .map_err(ResumeError::Storage)?;

        info!(%resume_id, file_uuid = %key, "resume file deleted");
        Ok(())
    }

    async fn owned(&self, owner: &AuthenticatedUser, resume_id: Uuid) -> ResumeResult<Resume> {
        self.store
            .find_resume(resume_id, owner.user_id)
            .await?
            .ok_or(ResumeError::NotFound)
    }

    /// Get-or-create for uploads. A concurrent insert of the same id surfaces
    /// as a conflict, after which the row is fetched again.
    async fn file_resume(
        &self,
        owner: &AuthenticatedUser,
        resume_id: Option<Uuid>,
    ) -> ResumeResult<Resume> {
        let Some(resume_id) = resume_id else {
            let created = self
                .store
                .insert_resume(NewResume::file_based(Uuid::new_v4(), owner.user_id))
                .await?;
            info!(resume_id = %created.id, user_id = %owner.user_id, "file resume created");
            return Ok(created);
        };

        if let Some(existing) = self.store.find_resume(resume_id, owner.user_id).await? {
            return ensure_file_based(existing);
        }

        match self
            .store
            .insert_resume(NewResume::file_based(resume_id, owner.user_id))
            .await
        {
            Ok(created) => {
                info!(%resume_id, user_id = %owner.user_id, "file resume created");
                Ok(created)
            }
            Err(StoreError::Conflict) => {
                debug!(%resume_id, "resume inserted concurrently, fetching again");
                let existing = self
                    .store
                    .find_resume(resume_id, owner.user_id)
                    .await?
                    .ok_or(ResumeError::NotFound)?;
                ensure_file_based(existing)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn ensure_file_based(resume: Resume) -> ResumeResult<Resume> {
    if resume.is_file_based() {
        Ok(resume)
    } else {
        warn!(resume_id = %resume.id, "refusing to attach a file to a content-based resume");
        Err(ResumeError::KindMismatch)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Path ids that are not UUIDs cannot name a resume.
pub fn parse_resume_id(raw: &str) -> ResumeResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ResumeError::NotFound)
}
