//! Database Module Tests
//!
//! SQLite complaint store: inserts, lookups, listings and status updates.

use super::{create_test_pool, new_complaint};
use crate::database::{self, SqliteComplaintStore};
use crate::models::{Category, City, ComplaintStatus, Priority};
use crate::traits::ComplaintStore;

#[cfg(test)]
mod insert_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_id_and_pending_status() {
        let (pool, _dir) = create_test_pool().await;

        let mut complaint = new_complaint("citizen-1", "Broken streetlight on 5th avenue", Some(City::Phoenix));
        complaint.image_urls = vec!["https://cdn.test/citizen-1/a.png".to_string()];

        let stored = database::insert_complaint(&pool, complaint)
            .await
            .expect("Failed to insert complaint");

        assert!(!stored.id.is_empty());
        assert_eq!(stored.user_id, "citizen-1");
        assert_eq!(stored.city, Some(City::Phoenix));
        assert_eq!(stored.category, Category::InfrastructureRoads);
        assert_eq!(stored.priority, Priority::Medium);
        assert_eq!(stored.status, ComplaintStatus::Pending);
        assert_eq!(stored.image_urls, vec!["https://cdn.test/citizen-1/a.png"]);
        assert!(stored.created_at > 0);
    }

    #[tokio::test]
    async fn test_insert_without_city() {
        let (pool, _dir) = create_test_pool().await;

        let stored = database::insert_complaint(&pool, new_complaint("u", "Loud noise every night", None))
            .await
            .unwrap();

        let fetched = database::get_complaint(&pool, &stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.city, None);
        assert!(fetched.image_urls.is_empty());
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (pool, _dir) = create_test_pool().await;

        let a = database::insert_complaint(&pool, new_complaint("u", "Trash not collected", None))
            .await
            .unwrap();
        let b = database::insert_complaint(&pool, new_complaint("u", "Trash not collected", None))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }
}

#[cfg(test)]
mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_unknown_id() {
        let (pool, _dir) = create_test_pool().await;
        assert!(database::get_complaint(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_listing_is_newest_first_and_isolated() {
        let (pool, _dir) = create_test_pool().await;

        let mut ids = Vec::new();
        for i in 0..3 {
            let stored = database::insert_complaint(
                &pool,
                new_complaint("alice", &format!("Pothole number {} on Oak road", i), None),
            )
            .await
            .unwrap();
            ids.push(stored.id);
        }
        database::insert_complaint(&pool, new_complaint("bob", "Park benches are broken", None))
            .await
            .unwrap();

        let alice = database::get_user_complaints(&pool, "alice").await.unwrap();
        let listed: Vec<_> = alice.iter().map(|c| c.id.clone()).collect();
        ids.reverse();
        assert_eq!(listed, ids);

        let bob = database::get_user_complaints(&pool, "bob").await.unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].category, Category::ParksRecreation);
    }

    #[tokio::test]
    async fn test_list_all() {
        let (pool, _dir) = create_test_pool().await;

        database::insert_complaint(&pool, new_complaint("a", "Sewage smell near the river", None))
            .await
            .unwrap();
        let last = database::insert_complaint(&pool, new_complaint("b", "Crime at the corner store", None))
            .await
            .unwrap();

        let all = database::get_all_complaints(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, last.id);
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_status() {
        let (pool, _dir) = create_test_pool().await;
        let store = SqliteComplaintStore::new(pool);

        let stored = store
            .insert(new_complaint("u", "Garbage overflowing at the bus stop", None))
            .await
            .unwrap();

        let updated = store
            .update_status(&stored.id, ComplaintStatus::InProgress)
            .await
            .unwrap()
            .expect("complaint should exist");
        assert_eq!(updated.status, ComplaintStatus::InProgress);

        let fetched = store.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ComplaintStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_status_unknown_id() {
        let (pool, _dir) = create_test_pool().await;
        let store = SqliteComplaintStore::new(pool);

        let result = store.update_status("missing", ComplaintStatus::Resolved).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_init_db_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fresh.sqlite");

        let pool = database::init_db(&db_path).await.expect("init_db should succeed");
        let store = SqliteComplaintStore::new(pool);

        assert!(db_path.exists());
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
