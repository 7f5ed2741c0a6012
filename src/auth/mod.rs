pub mod jwt;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, models::User, state::AppState};

/// Caller identity resolved by [`require_user`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Resolves the bearer token to a known user and stores it in the request
/// extensions. Rejected requests never reach a handler.
pub async fn require_user(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        warn!(path = %request.uri().path(), "request without bearer token");
        AppError::invalid_token()
    })?;

    let claims = state.jwt.verify_token(bearer.token()).map_err(|err| {
        warn!(error = %err, "rejected bearer token");
        AppError::invalid_token()
    })?;

    let user = state
        .store
        .find_user(claims.sub)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "token refers to unknown user");
            AppError::invalid_user()
        })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(user));
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(AppError::invalid_token)
    }
}
