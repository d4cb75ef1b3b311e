use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request counter keyed by client address.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    inner: Arc<Mutex<Buckets>>,
    window: Duration,
    max_requests: usize,
}

#[derive(Debug, Default)]
struct Buckets {
    clients: HashMap<String, VecDeque<Instant>>,
    last_prune: Option<Instant>,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buckets::default())),
            window,
            max_requests: max_requests.max(1),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut guard = self.inner.lock();

        // Idle clients are swept at most once per window.
        let due = guard
            .last_prune
            .map_or(true, |last| now.duration_since(last) >= self.window);
        if due {
            let window = self.window;
            guard.clients.retain(|_, queue| {
                queue
                    .back()
                    .is_some_and(|last| now.duration_since(*last) <= window)
            });
            guard.last_prune = Some(now);
        }

        let queue = guard.clients.entry(key.to_string()).or_default();
        while let Some(front) = queue.front() {
            if now.duration_since(*front) > self.window {
                queue.pop_front();
            } else {
                break;
            }
        }

        if queue.len() >= self.max_requests {
            return false;
        }

        queue.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_and_recovers_after_window() {
        let limiter = IpRateLimiter::new(Duration::from_secs(10), 2);
        let start = Instant::now();

        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(!limiter.allow_at("1.2.3.4", start));
        assert!(limiter.allow_at("5.6.7.8", start));

        assert!(limiter.allow_at("1.2.3.4", start + Duration::from_secs(11)));
    }

    #[test]
    fn idle_clients_are_swept_once_per_window() {
        let limiter = IpRateLimiter::new(Duration::from_secs(10), 5);
        let start = Instant::now();

        for n in 0..100 {
            assert!(limiter.allow_at(&format!("10.0.0.{n}"), start));
        }
        assert_eq!(limiter.inner.lock().clients.len(), 100);

        assert!(limiter.allow_at("fresh", start + Duration::from_secs(5)));
        assert_eq!(limiter.inner.lock().clients.len(), 101);

        assert!(limiter.allow_at("fresh", start + Duration::from_secs(11)));
        let buckets = limiter.inner.lock();
        assert_eq!(buckets.clients.len(), 1);
        assert_eq!(buckets.last_prune, Some(start + Duration::from_secs(11)));
    }
}
