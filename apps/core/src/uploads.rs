//! Sequential photo upload for a submission.
//!
//! Images go up one at a time. A failing image is logged and left out of the
//! result; it never aborts the submission, and files that did make it are not
//! removed if a later step fails.

use thiserror::Error;
use tracing::{info, warn};

use crate::models::ImageUpload;
use crate::traits::ImageStorage;

/// Maximum number of photos attached to one complaint.
pub const MAX_IMAGES_PER_COMPLAINT: usize = 3;

/// Why a single image could not be stored.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image is empty")]
    Empty,

    #[error("image is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("{0} is not a recognised image format")]
    NotAnImage(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Uploads `images` in order and returns the URLs of the ones that succeeded.
pub async fn upload_images(storage: &dyn ImageStorage, user_id: &str, images: &[ImageUpload]) -> Vec<String> {
    let mut uploaded_urls = Vec::with_capacity(images.len());

    for image in images {
        match storage.upload(user_id, image).await {
            Ok(url) => uploaded_urls.push(url),
            Err(e) => warn!(user_id, file = %image.file_name, "Dropping image that failed to upload: {}", e),
        }
    }

    if !images.is_empty() {
        info!(
            user_id,
            uploaded = uploaded_urls.len(),
            requested = images.len(),
            "Image upload finished"
        );
    }

    uploaded_urls
}
