use std::path::PathBuf;

use tokio::fs;
use uuid::Uuid;
use yatube_core::forms::CleanImage;

/// Sub-directory of the media root that holds post images.
const POSTS_DIR: &str = "posts";

/// Uploaded files on disk, served back under `/media/`.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Writes the image under a fresh name and returns its media-relative path.
    pub async fn save_post_image(&self, image: &CleanImage) -> std::io::Result<String> {
        let dir = self.root.join(POSTS_DIR);
        fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::now_v7(), image.extension());
        fs::write(dir.join(&file_name), &image.bytes).await?;

        let relative = format!("{POSTS_DIR}/{file_name}");
        tracing::debug!(path = %relative, "stored post image");
        Ok(relative)
    }
}
