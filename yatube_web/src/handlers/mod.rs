pub mod about;
pub mod auth;
pub mod follows;
pub mod posts;

use askama::Template;
use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use yatube_core::{ids::PostId, pagination::PageRequest};

use crate::{
    error::{not_found_page, AppError},
    extract::Viewer,
};

/// `?page=N`; anything unparseable falls back to the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn render(template: impl Template) -> Result<Response, AppError> {
    Ok(Html(template.render()?).into_response())
}

/// Post ids that do not parse name no post.
pub fn parse_post_id(raw: &str) -> Result<PostId, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

pub async fn not_found(viewer: Viewer) -> Response {
    not_found_page(viewer.username())
}
