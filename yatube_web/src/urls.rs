//! Paths of the pages, as used in redirects and templates.

use yatube_core::ids::PostId;

pub const INDEX: &str = "/";
pub const FOLLOW_INDEX: &str = "/follow/";
pub const POST_CREATE: &str = "/create/";
pub const LOGIN: &str = "/auth/login/";

fn segment(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%40", "@")
        .replace("%2B", "+")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", segment(username))
}

pub fn post_detail(post_id: PostId) -> String {
    format!("/posts/{post_id}/")
}

/// Login page that returns to `path` afterwards. Slashes stay readable.
pub fn login_with_next(path: &str) -> String {
    format!("{LOGIN}?next={}", urlencoding::encode(path).replace("%2F", "/"))
}

/// Only local absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
            next
        }
        _ => INDEX,
    }
}
