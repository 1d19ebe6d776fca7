use axum::response::Response;

use crate::{
    error::AppError,
    extract::Viewer,
    handlers::render,
    templates::{AboutAuthorTemplate, AboutTechTemplate},
};

pub async fn author(viewer: Viewer) -> Result<Response, AppError> {
    render(AboutAuthorTemplate {
        viewer: viewer.username(),
    })
}

pub async fn tech(viewer: Viewer) -> Result<Response, AppError> {
    render(AboutTechTemplate {
        viewer: viewer.username(),
    })
}
