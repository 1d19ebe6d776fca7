use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::{
    error::AppError,
    extract::RequireUser,
    handlers::found,
    state::AppState,
    urls,
};

pub async fn profile_follow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state.core.follows.follow(user.id, &username).await?;
    tracing::debug!(follower = %user.username, author = %username, ?outcome, "follow requested");

    Ok(found(urls::FOLLOW_INDEX))
}

pub async fn profile_unfollow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    state.core.follows.unfollow(user.id, &username).await?;

    Ok(found(urls::FOLLOW_INDEX))
}
