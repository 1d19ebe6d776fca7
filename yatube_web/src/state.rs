use std::sync::Arc;
use std::time::Duration;

use yatube_core::YatubeCore;

use crate::cache::PageCache;
use crate::media::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<YatubeCore>,
    /// Rendered home feed pages.
    pub cache: PageCache,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(core: YatubeCore) -> Self {
        let cache = PageCache::new(Duration::from_secs(core.config.index_cache_seconds));
        let media = MediaStore::new(core.config.media_root.clone());

        Self {
            core: Arc::new(core),
            cache,
            media,
        }
    }
}
