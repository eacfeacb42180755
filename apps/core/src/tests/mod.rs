//! Test Module
//!
//! Cross-module suites for the CivicVoice backend.
//!
//! ## Test Categories
//! - `classifier_tests`: keyword classification end to end
//! - `database_tests`: SQLite complaint store
//! - `submission_tests`: the submission workflow with mocked collaborators
//! - `api_tests`: HTTP routes driven through `tower::ServiceExt::oneshot`

pub mod database_tests;
pub mod submission_tests;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};

use crate::classifier::{ClassificationError, KeywordClassifier};
use crate::database;
use crate::error::AppError;
use crate::models::{
    AnalysisResult, City, ComplaintInput, ComplaintStatus, ImageUpload, NewComplaint, StoredComplaint,
};
use crate::traits::{Classifier, ComplaintStore, ImageStorage};
use crate::uploads::UploadError;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Smallest byte sequence `infer` recognises as a PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// Create a migrated test database. Keep the returned dir alive for the test.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let dir = tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.sqlite");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("Failed to create test pool");

    database::migrate(&pool).await.expect("Failed to run migrations");

    (pool, dir)
}

pub fn png(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        bytes: PNG_BYTES.to_vec(),
    }
}

/// A complaint ready for the store, classified by the keyword rules.
pub fn new_complaint(user_id: &str, text: &str, city: Option<City>) -> NewComplaint {
    let input = ComplaintInput {
        text: text.to_string(),
        city,
    };
    let analysis = KeywordClassifier::analyze(&input.text, city);
    NewComplaint {
        user_id: user_id.to_string(),
        input,
        analysis,
        image_urls: Vec::new(),
    }
}

/// Classifier that either runs the keyword rules instantly or always fails.
pub struct MockClassifier {
    fail: bool,
    pub calls: AtomicUsize,
}

impl MockClassifier {
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn classify(&self, text: &str, city: Option<City>) -> Result<AnalysisResult, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClassificationError::Rejected("model offline".to_string()));
        }
        Ok(KeywordClassifier::analyze(text, city))
    }
}

/// Image storage that keeps uploads in memory and fails names starting with "bad".
#[derive(Default)]
pub struct MemoryImageStorage {
    pub uploaded: Mutex<Vec<String>>,
}

impl MemoryImageStorage {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStorage for MemoryImageStorage {
    async fn upload(&self, user_id: &str, image: &ImageUpload) -> Result<String, UploadError> {
        if image.file_name.starts_with("bad") {
            return Err(UploadError::Backend("bucket unavailable".to_string()));
        }
        self.uploaded.lock().unwrap().push(image.file_name.clone());
        Ok(format!("https://cdn.test/{}/{}", user_id, image.file_name))
    }
}

/// Store whose writes always fail; reads return nothing.
pub struct BrokenStore;

#[async_trait]
impl ComplaintStore for BrokenStore {
    async fn insert(&self, _complaint: NewComplaint) -> Result<StoredComplaint, AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }

    async fn get(&self, _id: &str) -> Result<Option<StoredComplaint>, AppError> {
        Ok(None)
    }

    async fn list_for_user(&self, _user_id: &str) -> Result<Vec<StoredComplaint>, AppError> {
        Ok(Vec::new())
    }

    async fn list_all(&self) -> Result<Vec<StoredComplaint>, AppError> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _id: &str,
        _status: ComplaintStatus,
    ) -> Result<Option<StoredComplaint>, AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }
}
