//! Debug panel backing store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::types::DebugEntry;

pub const DEFAULT_DEBUG_LOG_CAPACITY: usize = 200;

/// Callback receiving every debug entry the shell emits.
pub type DebugSink = Arc<dyn Fn(DebugEntry) + Send + Sync>;

#[derive(Clone)]
pub struct DebugLog {
    entries: Arc<Mutex<VecDeque<DebugEntry>>>,
    capacity: usize,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEBUG_LOG_CAPACITY)
    }
}

impl DebugLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, entry: DebugEntry) {
        tracing::trace!(
            source = entry.source.label(),
            label = %entry.label,
            "debug entry"
        );
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn sink(&self) -> DebugSink {
        let log = self.clone();
        Arc::new(move |entry| log.push(entry))
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<DebugEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.label.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
