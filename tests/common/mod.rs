use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use bytes::Bytes;
use chrono::Utc;
use http_body_util::BodyExt;
use resumes::auth::jwt::JwtService;
use resumes::auth::AuthenticatedUser;
use resumes::config::{AppConfig, DEFAULT_MAX_UPLOAD_BYTES};
use resumes::db;
use resumes::lifecycle::ResumeLifecycle;
use resumes::models::{Apply, NewResume, Resume, ResumeApply, ResumeChanges, User};
use resumes::routes;
use resumes::state::AppState;
use resumes::storage::{public_object_url, ObjectStorage};
use resumes::store::{ResumeStore, StoreError, StoreResult};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const PUBLIC_URL: &str = "https://fake-storage";
pub const BUCKET: &str = "test-bucket";

#[allow(dead_code)]
#[derive(Clone)]
pub struct StoredObject {
    pub key: String,
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: Mutex<usize>,
    fail_after_puts: Mutex<Option<usize>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<String>,
    ) -> Result<()> {
        let mut puts = self.puts.lock().await;
        if let Some(limit) = *self.fail_after_puts.lock().await {
            ensure!(*puts < limit, "storage unavailable");
        }
        *puts += 1;

        let stored = StoredObject {
            key: key.to_string(),
            bytes,
            content_type,
        };
        let mut guard = self.objects.lock().await;
        guard.insert(stored.key.clone(), stored);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let mut guard = self.objects.lock().await;
        guard.remove(key);
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        public_object_url(PUBLIC_URL, BUCKET, key)
    }
}

#[allow(dead_code)]
impl FakeStorage {
    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        let guard = self.objects.lock().await;
        guard.get(key).cloned()
    }

    pub async fn object_count(&self) -> usize {
        let guard = self.objects.lock().await;
        guard.len()
    }

    /// Accept `limit` more uploads, then fail every later one.
    pub async fn fail_after(&self, limit: usize) {
        let puts = *self.puts.lock().await;
        *self.fail_after_puts.lock().await = Some(puts + limit);
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    resumes: Mutex<Vec<Resume>>,
    applications: Mutex<Vec<(Apply, ResumeApply)>>,
    racing_insert: Mutex<Option<NewResume>>,
}

#[async_trait]
impl ResumeStore for InMemoryStore {
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn list_resumes(&self, owner: Uuid) -> StoreResult<Vec<Resume>> {
        let guard = self.resumes.lock().await;
        Ok(guard.iter().filter(|r| r.user_id == owner).cloned().collect())
    }

    async fn find_resume(&self, resume_id: Uuid, owner: Uuid) -> StoreResult<Option<Resume>> {
        let guard = self.resumes.lock().await;
        Ok(guard
            .iter()
            .find(|r| r.id == resume_id && r.user_id == owner)
            .cloned())
    }

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<Resume> {
        let mut guard = self.resumes.lock().await;

        // Another request wins the race for this id just before us.
        if let Some(winner) = self.racing_insert.lock().await.take() {
            guard.push(to_row(winner));
        }

        if guard.iter().any(|r| r.id == resume.id) {
            return Err(StoreError::Conflict);
        }
        let row = to_row(resume);
        guard.push(row.clone());
        Ok(row)
    }

    async fn update_resume(
        &self,
        resume_id: Uuid,
        owner: Uuid,
        changes: ResumeChanges,
    ) -> StoreResult<Option<Resume>> {
        let mut guard = self.resumes.lock().await;
        let Some(row) = guard
            .iter_mut()
            .find(|r| r.id == resume_id && r.user_id == owner)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(is_done) = changes.is_done {
            row.is_done = is_done;
        }
        if let Some(content) = changes.content {
            row.content = Some(content);
        }
        if let Some(file_url) = changes.file_url {
            row.file_url = file_url;
        }
        row.updated_at = changes.updated_at;
        Ok(Some(row.clone()))
    }

    async fn delete_resume(&self, resume_id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let mut guard = self.resumes.lock().await;
        let before = guard.len();
        guard.retain(|r| !(r.id == resume_id && r.user_id == owner));
        Ok(guard.len() != before)
    }

    async fn create_application(
        &self,
        owner: Uuid,
        resume_id: Uuid,
        job_posting_id: Uuid,
    ) -> StoreResult<(Apply, ResumeApply)> {
        if !self.resumes.lock().await.iter().any(|r| r.id == resume_id) {
            return Err(StoreError::MissingReference);
        }
        let now = Utc::now().naive_utc();
        let apply = Apply {
            id: Uuid::new_v4(),
            user_id: owner,
            job_posting_id,
            created_at: now,
            updated_at: now,
        };
        let binding = ResumeApply {
            id: Uuid::new_v4(),
            resume_id,
            apply_id: apply.id,
            created_at: now,
            updated_at: now,
        };
        self.applications
            .lock()
            .await
            .push((apply.clone(), binding.clone()));
        Ok((apply, binding))
    }
}

#[allow(dead_code)]
impl InMemoryStore {
    pub async fn add_user(&self, name: &str, email: &str) -> User {
        let now = Utc::now().naive_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            profile_image: String::new(),
            kakao_api_id: None,
            google_api_id: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().await.insert(user.id, user.clone());
        user
    }

    pub async fn resumes_of(&self, owner: Uuid) -> Vec<Resume> {
        self.list_resumes(owner).await.unwrap_or_default()
    }

    pub async fn resume(&self, resume_id: Uuid) -> Option<Resume> {
        let guard = self.resumes.lock().await;
        guard.iter().find(|r| r.id == resume_id).cloned()
    }

    pub async fn resume_count(&self) -> usize {
        self.resumes.lock().await.len()
    }

    pub async fn applications(&self) -> Vec<(Apply, ResumeApply)> {
        self.applications.lock().await.clone()
    }

    /// The next insert finds `resume` already stored, as if a concurrent
    /// request had created it first.
    pub async fn race_next_insert(&self, resume: NewResume) {
        *self.racing_insert.lock().await = Some(resume);
    }
}

fn to_row(resume: NewResume) -> Resume {
    let now = Utc::now().naive_utc();
    Resume {
        id: resume.id,
        user_id: resume.user_id,
        title: resume.title,
        is_done: resume.is_done,
        content: resume.content,
        is_file: resume.is_file,
        file_url: resume.file_url,
        file_uuid: resume.file_uuid,
        created_at: now,
        updated_at: now,
    }
}

#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        jwt_secret: "test-secret".to_string(),
        jwt_issuer: "test-issuer".to_string(),
        jwt_audience: "test-audience".to_string(),
        jwt_expiry_minutes: 60,
        cors_allowed_origin: None,
        aws_endpoint_url: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        aws_region: "us-east-1".to_string(),
        s3_bucket: BUCKET.to_string(),
        s3_public_url: PUBLIC_URL.to_string(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    }
}

#[allow(dead_code)]
pub fn caller(user: &User) -> AuthenticatedUser {
    AuthenticatedUser::from(user.clone())
}

/// Service wired to fresh in-memory collaborators.
#[allow(dead_code)]
pub fn lifecycle() -> (ResumeLifecycle, Arc<InMemoryStore>, Arc<FakeStorage>) {
    let store = Arc::new(InMemoryStore::default());
    let storage = Arc::new(FakeStorage::default());
    let service = ResumeLifecycle::new(store.clone(), storage.clone());
    (service, store, storage)
}

#[allow(dead_code)]
pub struct TestApp {
    router: Router,
    jwt: JwtService,
    store: Arc<InMemoryStore>,
    storage: Arc<FakeStorage>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Result<Self> {
        let config = test_config();
        let store = Arc::new(InMemoryStore::default());
        let storage = Arc::new(FakeStorage::default());
        let jwt = JwtService::from_config(&config)?;
        let state = AppState::new(config, store.clone(), storage.clone(), jwt.clone());
        let router = routes::create_router(state);

        Ok(Self {
            router,
            jwt,
            store,
            storage,
        })
    }

    pub fn store(&self) -> Arc<InMemoryStore> {
        self.store.clone()
    }

    pub fn storage(&self) -> Arc<FakeStorage> {
        self.storage.clone()
    }

    /// Registers a user and returns its id with a valid access token.
    pub async fn sign_up(&self, name: &str, email: &str) -> Result<(Uuid, String)> {
        let user = self.store.add_user(name, email).await;
        let token = self.jwt.generate_token(user.id)?;
        Ok((user.id, token))
    }

    pub fn token_for(&self, user_id: Uuid) -> Result<String> {
        self.jwt.generate_token(user_id)
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_raw(Method::POST, path, serde_json::to_vec(payload)?, token)
            .await
    }

    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_raw(Method::PATCH, path, serde_json::to_vec(payload)?, token)
            .await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Vec<u8>,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body))?;
        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        self.without_body(Method::GET, path, token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        self.without_body(Method::DELETE, path, token).await
    }

    /// Sends `files` as repeated `file` parts of one multipart request.
    pub async fn upload_files(
        &self,
        path: &str,
        files: &[(&str, &str, &str)],
        token: &str,
    ) -> Result<hyper::Response<Body>> {
        let boundary = format!("boundary-{}", Uuid::new_v4());
        let mut body = Vec::new();
        for (filename, content_type, data) in files {
            body.extend(format!("--{boundary}\r\n").as_bytes());
            body.extend(
                format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend(data.as_bytes());
            body.extend(b"\r\n");
        }
        body.extend(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body))?;
        self.send(request).await
    }

    async fn without_body(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Result<hyper::Response<Body>> {
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

#[allow(dead_code)]
pub async fn body_json(response: hyper::Response<Body>) -> Result<Value> {
    let collected = response
        .into_body()
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(serde_json::from_slice(&collected.to_bytes())?)
}
