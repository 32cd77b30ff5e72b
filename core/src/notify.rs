//! User-facing error notification.
//!
//! The client calls the notifier once per rejected call, at classification
//! time, before returning the error. Implementations must not block.

use std::sync::{Arc, Mutex};

pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Emits the message as a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        tracing::error!(target: "nettools::notify", "{message}");
    }
}

/// Keeps every message in memory. Useful for hosts that render notifications
/// themselves, and for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        let mut guard = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(message.to_string());
    }
}
