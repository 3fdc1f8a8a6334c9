use std::sync::{Mutex, PoisonError};

use alloy::primitives::Address;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A user-facing message about one account or about the whole run.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub account: Option<Address>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, account: Option<Address>, message: impl Into<String>) -> Self {
        Self {
            kind,
            account,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, account: Option<Address>, message: String) {
        self.notify(Notification::new(NotificationKind::Success, account, message));
    }

    fn error(&self, account: Option<Address>, message: String) {
        self.notify(Notification::new(NotificationKind::Error, account, message));
    }
}

/// Prints notifications to stdout, one line each.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.kind {
            NotificationKind::Success => "OK ",
            NotificationKind::Error => "ERR",
        };
        let time = notification.timestamp.format("%H:%M:%S");
        match notification.account {
            Some(account) => println!("[{time}] {tag} {account}: {}", notification.message),
            None => println!("[{time}] {tag} {}", notification.message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
