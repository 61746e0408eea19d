//! Outbound alert delivery.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{LedgerError, Result};

/// Delivers one message. An `Err` means the recipient did not get it.
pub trait Notifier: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Keeps every delivered message in memory so it can be listed later.
#[derive(Debug, Default)]
pub struct Outbox {
    messages: Mutex<Vec<SentMessage>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Result<Vec<SentMessage>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|messages| messages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<SentMessage>>> {
        self.messages
            .lock()
            .map_err(|_| LedgerError::Notification("outbox lock poisoned".into()))
    }
}

impl Notifier for Outbox {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.lock()?.push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        });
        tracing::info!(recipient, subject, "notification recorded in outbox");
        Ok(())
    }
}
