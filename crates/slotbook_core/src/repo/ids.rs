//! Integer id generation.
//!
//! Ids are seeded from the wall clock in epoch milliseconds and forced to
//! increase strictly within a process. Callers pass a membership check so
//! ids already present in a collection are skipped.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id for which `is_taken` is false.
    pub fn next_id(&self, is_taken: impl Fn(i64) -> bool) -> i64 {
        loop {
            let now = Utc::now().timestamp_millis();
            let previous = self
                .last
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                    Some(now.max(last + 1))
                })
                .unwrap_or_else(|last| last);
            let candidate = now.max(previous + 1);
            if !is_taken(candidate) {
                return candidate;
            }
        }
    }
}
