//! Submission Workflow Tests
//!
//! Drives `SubmissionService` with mock classifiers and image storage over a
//! real SQLite store.

use std::sync::Arc;
use std::time::Duration;

use super::{create_test_pool, png, BrokenStore, MemoryImageStorage, MockClassifier};
use crate::database::SqliteComplaintStore;
use crate::error::AppError;
use crate::models::{Category, City, ComplaintStatus, ImageUpload, Priority, SubmissionRequest};
use crate::rate_limiter::RateLimiter;
use crate::submission::SubmissionService;
use crate::traits::ComplaintStore;

struct Harness {
    service: SubmissionService,
    classifier: Arc<MockClassifier>,
    images: Arc<MemoryImageStorage>,
    store: Arc<SqliteComplaintStore>,
    _dir: tempfile::TempDir,
}

async fn harness(classifier: MockClassifier, limit: usize) -> Harness {
    let (pool, dir) = create_test_pool().await;
    let classifier = Arc::new(classifier);
    let images = Arc::new(MemoryImageStorage::default());
    let store = Arc::new(SqliteComplaintStore::new(pool));

    let service = SubmissionService::new(
        classifier.clone(),
        store.clone(),
        images.clone(),
        RateLimiter::new(limit, Duration::from_secs(60)),
    );

    Harness {
        service,
        classifier,
        images,
        store,
        _dir: dir,
    }
}

fn request(text: &str, city: Option<&str>, images: Vec<ImageUpload>) -> SubmissionRequest {
    SubmissionRequest {
        text: text.to_string(),
        city: city.map(str::to_string),
        images,
    }
}

#[tokio::test]
async fn test_submit_stores_and_returns_receipt() {
    let h = harness(MockClassifier::working(), 10).await;

    let receipt = h
        .service
        .submit(
            "citizen-1",
            request(
                "  There is a dangerous pothole on Main St, please help urgently  ",
                Some("Chicago"),
                vec![png("hole.png")],
            ),
        )
        .await
        .expect("submission should succeed");

    assert_eq!(receipt.complaint_text, "There is a dangerous pothole on Main St, please help urgently");
    assert_eq!(receipt.city, Some(City::Chicago));
    assert_eq!(receipt.analysis.category, Category::InfrastructureRoads);
    assert_eq!(receipt.analysis.priority, Priority::High);
    assert_eq!(receipt.status, ComplaintStatus::Pending);
    assert_eq!(receipt.image_urls, vec!["https://cdn.test/citizen-1/hole.png"]);

    let stored = h.store.get(&receipt.complaint_id).await.unwrap().expect("stored");
    assert_eq!(stored.user_id, "citizen-1");
    assert_eq!(stored.summary, receipt.analysis.summary);
    assert_eq!(stored.department, "Department of Public Works");
}

#[tokio::test]
async fn test_failed_upload_is_dropped() {
    let h = harness(MockClassifier::working(), 10).await;

    let receipt = h
        .service
        .submit(
            "citizen-2",
            request(
                "Trash bins have not been emptied for weeks",
                None,
                vec![png("one.png"), png("bad.png"), png("three.png")],
            ),
        )
        .await
        .expect("a failed image must not abort the submission");

    assert_eq!(
        receipt.image_urls,
        vec!["https://cdn.test/citizen-2/one.png", "https://cdn.test/citizen-2/three.png"]
    );
    let stored = h.store.get(&receipt.complaint_id).await.unwrap().unwrap();
    assert_eq!(stored.image_urls.len(), 2);
}

#[tokio::test]
async fn test_classification_failure_persists_nothing() {
    let h = harness(MockClassifier::failing(), 10).await;

    let result = h
        .service
        .submit(
            "citizen-3",
            request("Water main burst on Elm street", None, vec![png("flood.png")]),
        )
        .await;

    assert!(matches!(result, Err(AppError::Classification(_))));
    assert!(h.store.list_all().await.unwrap().is_empty());
    // Photos are uploaded before classification and stay behind.
    assert_eq!(h.images.uploaded(), vec!["flood.png"]);
}

#[tokio::test]
async fn test_validation_failure_has_no_side_effects() {
    let h = harness(MockClassifier::working(), 10).await;

    let result = h
        .service
        .submit("citizen-4", request("too short", None, vec![png("a.png")]))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.classifier.call_count(), 0);
    assert!(h.images.uploaded().is_empty());
    assert!(h.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_too_many_images_rejected_before_upload() {
    let h = harness(MockClassifier::working(), 10).await;

    let images = vec![png("1.png"), png("2.png"), png("3.png"), png("4.png")];
    let result = h
        .service
        .submit("citizen-5", request("Graffiti all over the park walls", None, images))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(h.images.uploaded().is_empty());
    assert_eq!(h.classifier.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_city_rejected() {
    let h = harness(MockClassifier::working(), 10).await;

    let result = h
        .service
        .submit("citizen-6", request("Streetlight flickering all night", Some("Gotham"), vec![]))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_rate_limit_per_user() {
    let h = harness(MockClassifier::working(), 2).await;
    let text = "Noise from the construction site at 5am";

    for _ in 0..2 {
        h.service.submit("busy", request(text, None, vec![])).await.unwrap();
    }

    let result = h.service.submit("busy", request(text, None, vec![])).await;
    assert!(matches!(result, Err(AppError::RateLimited)));
    assert_eq!(h.classifier.call_count(), 2);

    // Someone else is unaffected.
    h.service.submit("calm", request(text, None, vec![])).await.unwrap();
}

#[tokio::test]
async fn test_rejected_submissions_do_not_use_quota() {
    let h = harness(MockClassifier::working(), 2).await;

    for _ in 0..2 {
        let result = h.service.submit("hasty", request("too short", None, vec![])).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    let too_many = vec![png("1.png"), png("2.png"), png("3.png"), png("4.png")];
    let result = h
        .service
        .submit("hasty", request("Pothole outside number 12", None, too_many))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let text = "Pothole outside number 12";
    h.service.submit("hasty", request(text, None, vec![])).await.expect("first valid submission");
    h.service.submit("hasty", request(text, None, vec![])).await.expect("second valid submission");

    let result = h.service.submit("hasty", request(text, None, vec![])).await;
    assert!(matches!(result, Err(AppError::RateLimited)));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_database_error() {
    let service = SubmissionService::new(
        Arc::new(MockClassifier::working()),
        Arc::new(BrokenStore),
        Arc::new(MemoryImageStorage::default()),
        RateLimiter::new(10, Duration::from_secs(60)),
    );

    let result = service
        .submit("citizen-7", request("Illegal dumping behind the mall", None, vec![]))
        .await;

    assert!(matches!(result, Err(AppError::Database(_))));
}
