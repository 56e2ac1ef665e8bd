//! User-facing notifications (the terminal counterpart of toast messages).

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use tracing::{debug, error, info};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        write!(f, "[{marker}] {}", self.message)
    }
}

#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to stderr and mirrors them into the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Success => info!(notification = %notification.message),
            NotificationLevel::Error => error!(notification = %notification.message),
        }
        if let Err(e) = writeln!(std::io::stderr().lock(), "{notification}") {
            debug!("Failed to write notification to stderr: {}", e);
        }
    }
}

/// Keeps notifications in memory, oldest first.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    received: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.lock().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) {
        self.received.lock().push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_level() {
        assert_eq!(Notification::success("saved").to_string(), "[ok] saved");
        assert_eq!(Notification::error("nope").to_string(), "[error] nope");
        assert!(Notification::error("x").is_error());
    }

    #[test]
    fn console_notifier_never_fails_the_caller() {
        let notifier = ConsoleNotifier;
        notifier.notify(&Notification::success("saved"));
        notifier.notify(&Notification::error("rejected"));
    }

    #[test]
    fn memory_notifier_keeps_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(&Notification::success("first"));
        notifier.notify(&Notification::error("second"));

        let messages: Vec<_> = notifier
            .notifications()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(notifier.last().unwrap().is_error());
    }
}
