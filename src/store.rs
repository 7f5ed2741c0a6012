use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use tokio::task;
use uuid::Uuid;

use crate::db::PgPool;
use crate::models::{
    Apply, NewApply, NewResume, NewResumeApply, Resume, ResumeApply, ResumeChanges, User,
};
use crate::schema::{applies, resume_applies, resumes, users};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record with this id already exists")]
    Conflict,
    #[error("referenced record does not exist")]
    MissingReference,
    #[error("database error: {0}")]
    Database(DieselError),
    #[error("database pool error: {0}")]
    Pool(String),
    #[error("database task failed: {0}")]
    Task(String),
}

impl From<DieselError> for StoreError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::Conflict
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                StoreError::MissingReference
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, resumes and job applications.
///
/// Every resume lookup is scoped by owner: a resume belonging to somebody
/// else is reported exactly like a missing one.
#[async_trait]
pub trait ResumeStore: Send + Sync + 'static {
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    async fn list_resumes(&self, owner: Uuid) -> StoreResult<Vec<Resume>>;

    async fn find_resume(&self, resume_id: Uuid, owner: Uuid) -> StoreResult<Option<Resume>>;

    /// Fails with [`StoreError::Conflict`] when a resume with the same id exists.
    async fn insert_resume(&self, resume: NewResume) -> StoreResult<Resume>;

    async fn update_resume(
        &self,
        resume_id: Uuid,
        owner: Uuid,
        changes: ResumeChanges,
    ) -> StoreResult<Option<Resume>>;

    async fn delete_resume(&self, resume_id: Uuid, owner: Uuid) -> StoreResult<bool>;

    /// Records an application and binds the resume to it, all or nothing.
    async fn create_application(
        &self,
        owner: Uuid,
        resume_id: Uuid,
        job_posting_id: Uuid,
    ) -> StoreResult<(Apply, ResumeApply)>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| StoreError::Pool(err.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        self.with_conn(move |conn| {
            Ok(users::table
                .find(user_id)
                .first::<User>(conn)
                .optional()?)
        })
        .await
    }

    async fn list_resumes(&self, owner: Uuid) -> StoreResult<Vec<Resume>> {
        self.with_conn(move |conn| {
            Ok(resumes::table
                .filter(resumes::user_id.eq(owner))
                .order((resumes::created_at.asc(), resumes::id.asc()))
                .load::<Resume>(conn)?)
        })
        .await
    }

    async fn find_resume(&self, resume_id: Uuid, owner: Uuid) -> StoreResult<Option<Resume>> {
        self.with_conn(move |conn| {
            Ok(resumes::table
                .filter(resumes::id.eq(resume_id))
                .filter(resumes::user_id.eq(owner))
                .first::<Resume>(conn)
                .optional()?)
        })
        .await
    }

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<Resume> {
        self.with_conn(move |conn| {
            Ok(diesel::insert_into(resumes::table)
                .values(&resume)
                .get_result::<Resume>(conn)?)
        })
        .await
    }

    async fn update_resume(
        &self,
        resume_id: Uuid,
        owner: Uuid,
        changes: ResumeChanges,
    ) -> StoreResult<Option<Resume>> {
        self.with_conn(move |conn| {
            let target = resumes::table
                .filter(resumes::id.eq(resume_id))
                .filter(resumes::user_id.eq(owner));
            Ok(diesel::update(target)
                .set(&changes)
                .get_result::<Resume>(conn)
                .optional()?)
        })
        .await
    }

    async fn delete_resume(&self, resume_id: Uuid, owner: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let target = resumes::table
                .filter(resumes::id.eq(resume_id))
                .filter(resumes::user_id.eq(owner));
            let deleted = diesel::delete(target).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn create_application(
        &self,
        owner: Uuid,
        resume_id: Uuid,
        job_posting_id: Uuid,
    ) -> StoreResult<(Apply, ResumeApply)> {
        self.with_conn(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let apply: Apply = diesel::insert_into(applies::table)
                    .values(&NewApply {
                        id: Uuid::new_v4(),
                        user_id: owner,
                        job_posting_id,
                    })
                    .get_result(conn)?;

                let binding: ResumeApply = diesel::insert_into(resume_applies::table)
                    .values(&NewResumeApply {
                        id: Uuid::new_v4(),
                        resume_id,
                        apply_id: apply.id,
                    })
                    .get_result(conn)?;

                Ok((apply, binding))
            })
        })
        .await
    }
}
