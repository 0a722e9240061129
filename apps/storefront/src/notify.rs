//! Transient user notifications.
//!
//! A bounded queue: when full, the oldest notification is dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Shared notification queue. Clones share the queue.
#[derive(Debug, Clone)]
pub struct Notifier {
    queue: Arc<Mutex<VecDeque<Notification>>>,
    capacity: usize,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Notifier {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(message = %message, "Notify");
        self.push(Level::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(message = %message, "Notify");
        self.push(Level::Error, message);
    }

    /// Removes and returns everything queued, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    fn push(&self, level: Level, message: String) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(Notification { level, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_dropped_when_full() {
        let notifier = Notifier::new(2);
        notifier.success("one");
        notifier.error("two");
        notifier.success("three");

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "two");
        assert_eq!(drained[0].level, Level::Error);
        assert_eq!(drained[1].message, "three");
        assert!(notifier.drain().is_empty());
    }

    #[test]
    fn test_zero_capacity_still_keeps_latest() {
        let notifier = Notifier::new(0);
        notifier.success("a");
        notifier.success("b");
        assert_eq!(notifier.drain()[0].message, "b");
    }
}
