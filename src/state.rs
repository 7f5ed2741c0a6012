use std::sync::Arc;

use crate::{
    auth::jwt::JwtService, config::AppConfig, lifecycle::ResumeLifecycle, storage::ObjectStorage,
    store::ResumeStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ResumeStore>,
    pub jwt: JwtService,
    pub resumes: ResumeLifecycle,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ResumeStore>,
        storage: Arc<dyn ObjectStorage>,
        jwt: JwtService,
    ) -> Self {
        let resumes = ResumeLifecycle::new(store.clone(), storage);
        Self {
            config: Arc::new(config),
            store,
            jwt,
            resumes,
        }
    }
}
