//! Transient user-facing messages emitted by the store.
//!
//! Sinks are fire-and-forget: `notify` returns nothing and must not block
//! the caller. A presentation layer turns notifications into toasts, a status
//! line, or whatever it renders.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes every notification to the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.variant {
            Variant::Default => tracing::info!(title = %n.title, "{}", n.description),
            Variant::Destructive => tracing::warn!(title = %n.title, "{}", n.description),
        }
    }
}

/// Forwards notifications over an unbounded channel to an event loop.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // A closed receiver means nobody is rendering anymore.
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification receiver dropped");
        }
    }
}

/// Keeps notifications in memory until drained.
#[derive(Debug, Default)]
pub struct MemorySink {
    seen: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock())
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().last().cloned()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
