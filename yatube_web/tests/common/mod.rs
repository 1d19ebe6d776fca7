#![allow(dead_code)]

use std::io::Cursor;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;
use yatube_core::{entity::prelude::DatabaseConnection, ids::UserId, test_utils, YatubeCore};
use yatube_web::{app_router, AppState};

const BOUNDARY: &str = "yatube-test-boundary";

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
    pub body: String,
}

impl TestResponse {
    pub fn assert_redirect(&self, location: &str) {
        assert_eq!(self.status, StatusCode::FOUND, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(location));
    }
}

/// A logged-in test user and the cookie header that authenticates them.
pub struct TestUser {
    pub id: UserId,
    pub username: String,
    pub cookie: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: DatabaseConnection,
    pub media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let media = tempfile::tempdir().expect("temp dir");
        let db = test_utils::setup_test_db().await;

        let config = test_utils::test_config(media.path());
        let core = YatubeCore::from_connection(config, db.clone()).expect("core");
        let state = AppState::new(core);
        let router = app_router(state.clone());

        Self {
            router,
            state,
            db,
            media,
        }
    }

    pub async fn user(&self, username: &str) -> TestUser {
        let id = test_utils::create_user(&self.db, username).await;
        let key = test_utils::open_session(&self.db, id).await;

        TestUser {
            id,
            username: username.to_string(),
            cookie: format!("sessionid={key}"),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, path: &str, user: Option<&TestUser>) -> TestResponse {
        let mut request = Request::get(path);
        if let Some(user) = user {
            request = request.header(header::COOKIE, &user.cookie);
        }
        self.send(request.body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_form(&self, path: &str, user: Option<&TestUser>, body: &str) -> TestResponse {
        let mut request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            request = request.header(header::COOKIE, &user.cookie);
        }
        self.send(request.body(Body::from(body.to_string())).expect("request"))
            .await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        user: Option<&TestUser>,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let mut request = Request::post(path).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(user) = user {
            request = request.header(header::COOKIE, &user.cookie);
        }
        let body = multipart_body(fields, file);
        self.send(request.body(Body::from(body)).expect("request"))
            .await
    }
}

/// Hand-built `multipart/form-data` body. The file, if any, goes in the
/// `image` field.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// A tiny valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .expect("encode png");
    bytes
}
