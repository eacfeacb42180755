use async_trait::async_trait;

use crate::classifier::ClassificationError;
use crate::error::AppError;
use crate::models::{AnalysisResult, City, ComplaintStatus, ImageUpload, NewComplaint, StoredComplaint};
use crate::uploads::UploadError;

/// Defines the public interface for a complaint classifier.
///
/// This trait abstracts where the analysis comes from, allowing the local keyword
/// heuristic and a remote classification service to be used interchangeably.
#[async_trait]
pub trait Classifier: Send + Sync + 'static {
    /// Short name used in logs ("local", "remote").
    fn name(&self) -> &'static str;

    /// Derives category, priority, department and summary from the complaint text.
    async fn classify(&self, text: &str, city: Option<City>) -> Result<AnalysisResult, ClassificationError>;
}

/// Defines the persistence boundary for complaint records.
///
/// Listings are ordered newest first.
#[async_trait]
pub trait ComplaintStore: Send + Sync + 'static {
    /// Creates a record with status `pending` and returns it.
    async fn insert(&self, complaint: NewComplaint) -> Result<StoredComplaint, AppError>;

    async fn get(&self, id: &str) -> Result<Option<StoredComplaint>, AppError>;

    /// Complaints filed by one user.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<StoredComplaint>, AppError>;

    /// Every complaint, for administrators.
    async fn list_all(&self) -> Result<Vec<StoredComplaint>, AppError>;

    /// Moves a complaint through its lifecycle. Returns `None` for an unknown id.
    async fn update_status(
        &self,
        id: &str,
        status: ComplaintStatus,
    ) -> Result<Option<StoredComplaint>, AppError>;
}

/// Defines where complaint photos end up.
#[async_trait]
pub trait ImageStorage: Send + Sync + 'static {
    /// Stores one image for `user_id` and returns its public URL.
    async fn upload(&self, user_id: &str, image: &ImageUpload) -> Result<String, UploadError>;
}
