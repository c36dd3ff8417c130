//! User-facing notifications for upload results.
//!
//! The uploader reports terminal events (success, rejection, failure) as
//! [`Notification`]s through a [`NotificationSink`]. Front-ends either
//! render them directly or collect them in a [`ToastQueue`].

mod toast;

pub use toast::{Toast, ToastQueue};

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A title/message pair with a severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }
}

/// Receives notifications for display.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl NotificationSink for Mutex<ToastQueue> {
    fn notify(&self, notification: Notification) {
        match self.lock() {
            Ok(mut queue) => {
                queue.push_notification(notification);
            }
            Err(poisoned) => {
                poisoned.into_inner().push_notification(notification);
            }
        }
    }
}

/// Writes notifications to the log instead of a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            title,
            message,
            severity,
        } = notification;
        match severity {
            Severity::Error => tracing::error!(%title, %message, "notification"),
            Severity::Success | Severity::Info => tracing::info!(%title, %message, "notification"),
        }
    }
}
