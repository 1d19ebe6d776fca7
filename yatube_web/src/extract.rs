//! Request-scoped identity: who is asking, resolved from the session cookie.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use yatube_core::{entity::prelude::UserModel, ids::UserId};

use crate::{error::AppError, handlers::found, state::AppState, urls};

pub const SESSION_COOKIE: &str = "sessionid";

/// The logged-in user, if any.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<UserModel>);

impl Viewer {
    pub fn user_id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }

    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|user| user.username.clone())
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(viewer) = parts.extensions.get::<Viewer>() {
            return Ok(viewer.clone());
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let user = match jar.get(SESSION_COOKIE) {
            Some(cookie) => state.core.sessions.resolve(cookie.value()).await?,
            None => None,
        };

        let viewer = Viewer(user);
        parts.extensions.insert(viewer.clone());
        Ok(viewer)
    }
}

/// A logged-in user. Anonymous requests are sent to the login page.
#[derive(Debug, Clone)]
pub struct RequireUser(pub UserModel);

/// Rejection of [`RequireUser`].
pub enum AuthRejection {
    Login { next: String },
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login { next } => found(&urls::login_with_next(&next)),
            AuthRejection::Failed(error) => error.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Viewer(user) = Viewer::from_request_parts(parts, state)
            .await
            .map_err(AuthRejection::Failed)?;

        match user {
            Some(user) => Ok(RequireUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                Err(AuthRejection::Login { next })
            }
        }
    }
}
