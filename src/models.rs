use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

/// Placeholder stored in `file_url` until a blob is attached, and used as the
/// initial title of file-based resumes.
pub const DEFAULT_PLACEHOLDER: &str = "default";

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_image: String,
    pub kakao_api_id: Option<i32>,
    pub google_api_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = resumes)]
#[diesel(belongs_to(User))]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_done: bool,
    pub content: Option<serde_json::Value>,
    pub is_file: bool,
    pub file_url: String,
    pub file_uuid: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Resume {
    pub fn is_file_based(&self) -> bool {
        self.is_file && self.file_uuid.is_some()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resumes)]
pub struct NewResume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_done: bool,
    pub content: Option<serde_json::Value>,
    pub is_file: bool,
    pub file_url: String,
    pub file_uuid: Option<String>,
}

impl NewResume {
    pub fn content_based(
        owner: Uuid,
        title: String,
        is_done: bool,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: owner,
            title,
            is_done,
            content: Some(content),
            is_file: false,
            file_url: DEFAULT_PLACEHOLDER.to_string(),
            file_uuid: None,
        }
    }

    pub fn file_based(id: Uuid, owner: Uuid) -> Self {
        Self {
            id,
            user_id: owner,
            title: DEFAULT_PLACEHOLDER.to_string(),
            is_done: true,
            content: None,
            is_file: true,
            file_url: DEFAULT_PLACEHOLDER.to_string(),
            file_uuid: Some(Uuid::new_v4().to_string()),
        }
    }
}

/// Partial update of a resume row. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = resumes)]
pub struct ResumeChanges {
    pub title: Option<String>,
    pub is_done: Option<bool>,
    pub content: Option<serde_json::Value>,
    pub file_url: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = applies)]
#[diesel(belongs_to(User))]
pub struct Apply {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_posting_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applies)]
pub struct NewApply {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_posting_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = resume_applies)]
#[diesel(belongs_to(Resume))]
#[diesel(belongs_to(Apply))]
pub struct ResumeApply {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub apply_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = resume_applies)]
pub struct NewResumeApply {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub apply_id: Uuid,
}
