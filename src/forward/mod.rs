//! The "forward email" capability used by `forward` actions.
//!
//! The engine hands a forwarder the email and the configured destination and
//! never looks at the result. Implementations report their own failures
//! through `tracing` and swallow them.

pub mod outbox;

use std::sync::Mutex;

use crate::model::email::Email;

pub use outbox::OutboxForwarder;

/// Sends (or queues) a copy of an email to a destination. Fire and forget.
pub trait Forwarder {
    fn forward(&self, email: &Email, destination: &str);
}

impl<F: Forwarder + ?Sized> Forwarder for &F {
    fn forward(&self, email: &Email, destination: &str) {
        (**self).forward(email, destination)
    }
}

impl<F: Forwarder + ?Sized> Forwarder for Box<F> {
    fn forward(&self, email: &Email, destination: &str) {
        (**self).forward(email, destination)
    }
}

/// Only logs the request. Default when no outbox is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogForwarder;

impl Forwarder for LogForwarder {
    fn forward(&self, email: &Email, destination: &str) {
        tracing::info!(
            from = %email.from,
            subject = %email.subject,
            destination,
            "Forward requested"
        );
    }
}

/// Remembers every forward request in memory.
#[derive(Debug, Default)]
pub struct RecordingForwarder {
    sent: Mutex<Vec<(String, Email)>>,
}

impl RecordingForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(destination, email snapshot)` pairs in request order.
    pub fn forwarded(&self) -> Vec<(String, Email)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Destinations only, in request order.
    pub fn destinations(&self) -> Vec<String> {
        self.forwarded().into_iter().map(|(d, _)| d).collect()
    }
}

impl Forwarder for RecordingForwarder {
    fn forward(&self, email: &Email, destination: &str) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((destination.to_string(), email.clone()));
    }
}
