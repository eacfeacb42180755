use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ImageUpload;
use crate::traits::ImageStorage;
use crate::uploads::UploadError;

// NOTE: expect() is acceptable here, the pattern is a compile-time constant.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Invalid regex: filename sanitizer"));

/// Layout of the service's data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Database directory (`./data/db`).
    pub fn db_dir(&self) -> PathBuf {
        self.root.join("db")
    }

    /// SQLite file holding the complaints table.
    pub fn db_file(&self) -> PathBuf {
        self.db_dir().join("civicvoice.sqlite")
    }

    /// Uploaded photos (`./data/uploads`).
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Uploaded photos of one user (`./data/uploads/{owner_dir_name}`).
    pub fn user_uploads_dir(&self, user_id: &str) -> PathBuf {
        self.uploads_dir().join(owner_dir_name(user_id))
    }

    /// Creates the data, db and uploads directories if they do not exist.
    pub fn init(&self) -> Result<(), AppError> {
        for dir in [self.root.clone(), self.db_dir(), self.uploads_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

/// Directory name for a user's photos. URL-safe base64 of the id, so distinct
/// ids never share a directory and the name needs no escaping in a URL.
pub fn owner_dir_name(user_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(user_id.as_bytes())
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `_` and strips leading dots.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(name, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// [`ImageStorage`] that writes photos under the data directory and serves them
/// from `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    paths: DataPaths,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalImageStorage {
    pub fn new(paths: DataPaths, public_base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            paths,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    fn check(&self, image: &ImageUpload) -> Result<(), UploadError> {
        if image.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if image.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: image.bytes.len(),
                max: self.max_bytes,
            });
        }
        if !infer::is_image(&image.bytes) {
            return Err(UploadError::NotAnImage(image.file_name.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn upload(&self, user_id: &str, image: &ImageUpload) -> Result<String, UploadError> {
        self.check(image)?;

        let user_dir = self.paths.user_uploads_dir(user_id);
        tokio::fs::create_dir_all(&user_dir).await?;

        // Every stored name is unique; photos are often all called `image.jpg`.
        let file_name = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(&image.file_name));
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(user_dir.join(&file_name))
            .await?;
        file.write_all(&image.bytes).await?;
        file.flush().await?;

        Ok(format!(
            "{}/{}/{}",
            self.public_base_url,
            owner_dir_name(user_id),
            file_name
        ))
    }
}
