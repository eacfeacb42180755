//! Complaint submission workflow.
//!
//! Steps run in a fixed order: validate, throttle, upload photos, classify,
//! persist. A failure stops the pipeline at that step; nothing is retried.

use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::models::{ComplaintInput, NewComplaint, SubmissionReceipt, SubmissionRequest};
use crate::rate_limiter::RateLimiter;
use crate::traits::{Classifier, ComplaintStore, ImageStorage};
use crate::uploads::{upload_images, MAX_IMAGES_PER_COMPLAINT};

/// Idle users are forgotten once the limiter tracks more than this many.
const LIMITER_PRUNE_THRESHOLD: usize = 1024;

pub struct SubmissionService {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn ComplaintStore>,
    images: Arc<dyn ImageStorage>,
    limiter: Mutex<RateLimiter>,
}

impl SubmissionService {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ComplaintStore>,
        images: Arc<dyn ImageStorage>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            classifier,
            store,
            images,
            limiter: Mutex::new(limiter),
        }
    }

    fn check_rate_limit(&self, user_id: &str) -> Result<(), AppError> {
        let mut limiter = self
            .limiter
            .lock()
            .map_err(|_| AppError::Internal("Rate limiter lock poisoned".to_string()))?;

        if limiter.tracked_users() > LIMITER_PRUNE_THRESHOLD {
            limiter.prune();
        }

        if limiter.check(user_id) {
            Ok(())
        } else {
            Err(AppError::RateLimited)
        }
    }

    /// Files a complaint on behalf of `user_id` and returns the receipt.
    #[instrument(skip(self, request), fields(images = request.images.len()))]
    pub async fn submit(&self, user_id: &str, request: SubmissionRequest) -> Result<SubmissionReceipt, AppError> {
        let input = ComplaintInput::parse(&request.text, request.city.as_deref())?;
        if request.images.len() > MAX_IMAGES_PER_COMPLAINT {
            return Err(AppError::Validation(format!(
                "At most {} images can be attached, got {}",
                MAX_IMAGES_PER_COMPLAINT,
                request.images.len()
            )));
        }

        // Only well-formed submissions count against the quota.
        if let Err(e) = self.check_rate_limit(user_id) {
            warn!("Submission refused: {}", e);
            return Err(e);
        }

        let image_urls = upload_images(self.images.as_ref(), user_id, &request.images).await;

        let analysis = self.classifier.classify(&input.text, input.city).await?;
        info!(
            classifier = self.classifier.name(),
            category = %analysis.category,
            priority = %analysis.priority,
            "Complaint classified"
        );

        let stored = self
            .store
            .insert(NewComplaint {
                user_id: user_id.to_string(),
                input,
                analysis: analysis.clone(),
                image_urls,
            })
            .await?;

        info!(complaint_id = %stored.id, "Complaint stored");

        Ok(SubmissionReceipt {
            complaint_id: stored.id,
            complaint_text: stored.complaint_text,
            city: stored.city,
            analysis,
            image_urls: stored.image_urls,
            status: stored.status,
        })
    }
}
