//! Whole-response cache for the home feed.

use std::time::Duration;

use axum::http::Uri;
use moka::future::Cache;
use yatube_core::ids::UserId;

const MAX_ENTRIES: u64 = 1_000;

#[derive(Clone)]
pub struct PageCache {
    pages: Cache<String, String>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();

        Self { pages }
    }

    /// One entry per route (path and query) and viewer.
    pub fn key(viewer: Option<UserId>, uri: &Uri) -> String {
        let route = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());

        match viewer {
            Some(user_id) => format!("{user_id}:{route}"),
            None => format!("anonymous:{route}"),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.pages.get(key).await
    }

    pub async fn insert(&self, key: String, body: String) {
        self.pages.insert(key, body).await;
    }

    pub fn clear(&self) {
        self.pages.invalidate_all();
    }
}
