use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Cached response for one previously-seen `Idempotency-Key`.
#[derive(Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub body: Value,
}

/// In-memory idempotency store for mutating HTTP endpoints. Keyed on the
/// client-supplied `Idempotency-Key` header; replays within the window
/// return the first response verbatim instead of re-running the handler.
pub struct IdempotencyStore {
    seen: parking_lot::Mutex<HashMap<String, (Instant, CachedResponse)>>,
    window: Duration,
}

impl IdempotencyStore {
    pub fn new(window: Duration) -> Self {
        Self {
            seen: parking_lot::Mutex::new(HashMap::new()),
            window,
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let mut map = self.seen.lock();
        let now = Instant::now();
        match map.get(key) {
            Some((ts, response)) if now.duration_since(*ts) < self.window => Some(response.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, response: CachedResponse) {
        let mut map = self.seen.lock();
        let now = Instant::now();
        if map.len() > 10_000 {
            map.retain(|_, (ts, _)| now.duration_since(*ts) < self.window);
        }
        map.insert(key, (now, response));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> CachedResponse {
        CachedResponse {
            status,
            body: serde_json::json!({"ok": true}),
        }
    }

    #[test]
    fn returns_none_for_unseen_key() {
        let store = IdempotencyStore::new(Duration::from_secs(60));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn replays_cached_response_within_window() {
        let store = IdempotencyStore::new(Duration::from_secs(60));
        store.insert("k1".to_string(), response(201));

        let cached = store.get("k1").expect("should be cached");
        assert_eq!(cached.status, 201);
        assert_eq!(cached.body, serde_json::json!({"ok": true}));
    }

    #[test]
    fn expires_entries_past_the_window() {
        let store = IdempotencyStore::new(Duration::from_millis(1));
        store.insert("k1".to_string(), response(200));
        std::thread::sleep(Duration::from_millis(20));

        assert!(store.get("k1").is_none());
    }

    #[test]
    fn distinct_keys_do_not_collide() {
        let store = IdempotencyStore::new(Duration::from_secs(60));
        store.insert("a".to_string(), response(200));
        store.insert("b".to_string(), response(409));

        assert_eq!(store.get("a").unwrap().status, 200);
        assert_eq!(store.get("b").unwrap().status, 409);
    }
}
