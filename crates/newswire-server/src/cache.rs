use std::time::{Duration, Instant};

use newswire_core::NewsItem;
use parking_lot::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CachedListing {
    payload: Vec<NewsItem>,
    captured_at: Instant,
}

/// Single-slot TTL cache for the "all news, newest first" listing.
///
/// One slot is enough: the listing endpoint is the only cached query. Every
/// access goes through the same lock, so a payload is never observed apart
/// from the timestamp it was stamped with.
pub struct ReadCache {
    slot: Mutex<Option<CachedListing>>,
    ttl: Duration,
}

impl ReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// The cached payload, if still fresh. An expired slot is cleared.
    pub fn get(&self) -> Option<Vec<NewsItem>> {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(cached) if cached.captured_at.elapsed() < self.ttl => {
                Some(cached.payload.clone())
            }
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Replace the slot, stamped now. Last writer wins.
    pub fn set(&self, payload: Vec<NewsItem>) {
        *self.slot.lock() = Some(CachedListing {
            payload,
            captured_at: Instant::now(),
        });
    }

    /// Clear the slot unconditionally; the next `get` misses.
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}

impl Default for ReadCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
