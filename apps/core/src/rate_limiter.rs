use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-user submission throttle using a sliding window.
///
/// Tracks the submission timestamps of each user and refuses a new one once
/// `limit` submissions fall inside the trailing `window`.
pub struct RateLimiter {
    /// Submission timestamps per user id.
    requests: HashMap<String, Vec<Instant>>,
    /// The maximum number of submissions allowed within the `window`.
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter`.
    ///
    /// # Arguments
    ///
    /// * `limit` - The number of submissions allowed per `window`.
    /// * `window` - The time duration of the sliding window.
    pub fn new(limit: usize, window: Duration) -> Self {
        RateLimiter {
            requests: HashMap::new(),
            limit,
            window,
        }
    }

    /// Checks whether `user_id` may submit now, recording the attempt if so.
    pub fn check(&mut self, user_id: &str) -> bool {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&mut self, user_id: &str, now: Instant) -> bool {
        let window = self.window;
        let user_requests = self.requests.entry(user_id.to_string()).or_default();

        // Remove timestamps older than the window
        user_requests.retain(|&timestamp| now.saturating_duration_since(timestamp) < window);

        if user_requests.len() < self.limit {
            user_requests.push(now);
            true
        } else {
            false
        }
    }

    /// Forgets users with no submission inside the window.
    pub fn prune(&mut self) {
        let now = Instant::now();
        let window = self.window;
        self.requests.retain(|_, timestamps| {
            timestamps
                .last()
                .is_some_and(|&last| now.saturating_duration_since(last) < window)
        });
    }

    /// Number of users currently tracked.
    pub fn tracked_users(&self) -> usize {
        self.requests.len()
    }
}
