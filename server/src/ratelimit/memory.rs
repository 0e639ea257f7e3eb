//! Process-local rate limit store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::ratelimit::{Clock, RateDecision, SystemClock};

#[derive(Debug, Default)]
struct Entries {
    /// Identifier to last accepted submission.
    last_accepted: HashMap<String, Instant>,
    /// Identifiers in first-insertion order, for eviction.
    order: VecDeque<String>,
}

/// In-memory map of client identifier to last accepted submission time.
///
/// Bounded by `max_entries`: when a new identifier pushes the map over the
/// cap, the identifier inserted first is evicted. Refreshing an existing
/// identifier keeps its original position. State is lost on restart.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<Entries>>,
    min_interval: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create a store using the system clock.
    pub fn new(min_interval: Duration, max_entries: usize) -> Self {
        Self::with_clock(min_interval, max_entries, Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source.
    pub fn with_clock(min_interval: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            min_interval,
            max_entries: max_entries.max(1),
            clock,
        }
    }

    /// Check whether `identifier` may submit now and record the attempt if so.
    ///
    /// The read and the write happen under one lock.
    pub fn check_and_record(&self, identifier: &str) -> RateDecision {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = entries.last_accepted.get(identifier) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.min_interval {
                return RateDecision::Limited {
                    retry_after: self.min_interval - elapsed,
                };
            }
        }

        if entries
            .last_accepted
            .insert(identifier.to_string(), now)
            .is_none()
        {
            entries.order.push_back(identifier.to_string());
        }

        while entries.last_accepted.len() > self.max_entries {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.last_accepted.remove(&oldest);
        }

        RateDecision::Allowed
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_accepted
            .len()
    }

    /// Whether no identifier is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
