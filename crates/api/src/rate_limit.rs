use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window limiter keyed by caller IP.
///
/// The key comes from `x-forwarded-for`, which the caller controls, so the
/// table must not grow with the number of distinct keys ever seen: every
/// `allow` call sweeps out keys whose hits have all aged past the window.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    hits: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            hits: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut table = self.hits.lock();

        table.retain(|_, hits| {
            while hits
                .front()
                .is_some_and(|hit| now.duration_since(*hit) > self.window)
            {
                hits.pop_front();
            }
            !hits.is_empty()
        });

        let hits = table.entry(key.to_string()).or_default();
        if hits.len() >= self.max_requests {
            return false;
        }

        hits.push_back(now);
        true
    }

    /// Number of keys currently holding in-window hits.
    pub fn tracked_keys(&self) -> usize {
        self.hits.lock().len()
    }
}
