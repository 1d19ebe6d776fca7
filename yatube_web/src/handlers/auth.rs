use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use yatube_core::{
    entity::prelude::UserModel,
    forms::{FormErrors, LoginForm, SignupForm, INVALID_LOGIN, USERNAME_TAKEN},
    service::users::UsersServiceError,
};

use crate::{
    error::AppError,
    extract::{Viewer, SESSION_COOKIE},
    handlers::{found, render},
    state::AppState,
    templates::{LoginTemplate, SignupTemplate},
    urls,
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Opens a session for `user` and sends them on to `next`.
async fn log_in(
    state: &AppState,
    jar: CookieJar,
    user: &UserModel,
    next: &str,
) -> Result<Response, AppError> {
    let session = state.core.sessions.open(user.id).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    tracing::info!(username = %user.username, "logged in");
    Ok((jar.add(cookie), found(next)).into_response())
}

pub async fn login_form(
    viewer: Viewer,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    render(LoginTemplate {
        viewer: viewer.username(),
        username: String::new(),
        next: query.next.unwrap_or_default(),
        errors: FormErrors::new(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let errors = match form.clean() {
        Ok(()) => {
            match state
                .core
                .users
                .authenticate(&form.username, &form.password)
                .await?
            {
                Some(user) => {
                    let next = urls::safe_next(form.next.as_deref());
                    return log_in(&state, jar, &user, next).await;
                }
                None => {
                    let mut errors = FormErrors::new();
                    errors.non_field(INVALID_LOGIN);
                    errors
                }
            }
        }
        Err(errors) => errors,
    };

    render(LoginTemplate {
        viewer: viewer.username(),
        username: form.username,
        next: form.next.unwrap_or_default(),
        errors,
    })
}

pub async fn signup_form(viewer: Viewer) -> Result<Response, AppError> {
    render(SignupTemplate {
        viewer: viewer.username(),
        username: String::new(),
        errors: FormErrors::new(),
    })
}

pub async fn signup(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(mut form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let errors = match form.clean() {
        Ok(()) => match state
            .core
            .users
            .register(&form.username, &form.password1)
            .await
        {
            Ok(user) => return log_in(&state, jar, &user, urls::INDEX).await,
            Err(UsersServiceError::UsernameTaken) => {
                let mut errors = FormErrors::new();
                errors.add("username", USERNAME_TAKEN);
                errors
            }
            Err(error) => return Err(error.into()),
        },
        Err(errors) => errors,
    };

    render(SignupTemplate {
        viewer: viewer.username(),
        username: form.username,
        errors,
    })
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.core.sessions.close(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, found(urls::INDEX)).into_response())
}
