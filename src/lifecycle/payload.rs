use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::ResumeError;

/// Structured body of a manually authored resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
    pub description: Value,
    pub career: Value,
    pub education: Value,
    pub skill: Value,
}

impl ResumeContent {
    pub fn into_value(self) -> Value {
        serde_json::json!({
            "description": self.description,
            "career": self.career,
            "education": self.education,
            "skill": self.skill,
        })
    }
}

/// Body accepted by resume create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePayload {
    pub title: String,
    pub is_done: bool,
    pub content: ResumeContent,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResumePayload {
    title: String,
    is_done: bool,
    description: Value,
    career: Value,
    education: Value,
    skill: Value,
}

impl ResumePayload {
    pub fn parse(body: &[u8]) -> Result<Self, ResumeError> {
        Self::from_value(parse_json(body)?)
    }

    /// Reads the resume keys out of an already decoded body.
    pub fn from_value(value: Value) -> Result<Self, ResumeError> {
        let raw: RawResumePayload = from_value(value)?;
        Ok(Self {
            title: raw.title,
            is_done: raw.is_done,
            content: ResumeContent {
                description: raw.description,
                career: raw.career,
                education: raw.education,
                skill: raw.skill,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApplyPayload {
    pub resume_id: Uuid,
    pub job_posting_id: Uuid,
}

impl ApplyPayload {
    pub fn parse(body: &[u8]) -> Result<Self, ResumeError> {
        decode(body)
    }
}

/// One uploaded file as read from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// First decoding step: the body must be JSON, whatever keys it carries.
pub fn parse_json(body: &[u8]) -> Result<Value, ResumeError> {
    serde_json::from_slice(body).map_err(|err| ResumeError::Malformed(err.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ResumeError> {
    serde_json::from_value(value).map_err(|err| ResumeError::Validation(err.to_string()))
}

// Undecodable JSON and missing keys are reported separately.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ResumeError> {
    from_value(parse_json(body)?)
}
