use crate::{Notification, Severity};

/// Display time for success and info toasts, in milliseconds.
const DEFAULT_DURATION_MS: u64 = 4000;

/// Error toasts stay up longer.
const ERROR_DURATION_MS: u64 = 6000;

fn duration_for(severity: Severity) -> u64 {
    match severity {
        Severity::Error => ERROR_DURATION_MS,
        Severity::Success | Severity::Info => DEFAULT_DURATION_MS,
    }
}

/// A queued notification with its id and display time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub duration_ms: u64,
}

/// In-memory notification queue with monotonic ids.
///
/// Dismissal timing belongs to the front-end; the queue only stores toasts
/// in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a notification with the display time for its severity.
    /// Returns the assigned id.
    pub fn push_notification(&mut self, notification: Notification) -> u64 {
        let duration_ms = duration_for(notification.severity);
        self.push(
            notification.severity,
            notification.title,
            notification.message,
            duration_ms,
        )
    }

    /// Queues a toast with an explicit display time.
    pub fn push(
        &mut self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        duration_ms: u64,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            severity,
            title: title.into(),
            message: message.into(),
            duration_ms,
        });
        id
    }

    /// Removes a toast by id. Returns `true` if it was queued.
    pub fn remove(&mut self, id: u64) -> bool {
        let len_before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != len_before
    }

    pub fn get(&self, id: u64) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    /// Most recent toast, if any.
    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_order_kept() {
        let mut q = ToastQueue::new();
        let a = q.push_notification(Notification::success("Success!", "File Upload Success"));
        let b = q.push_notification(Notification::error("Error", "too big"));
        let c = q.push_notification(Notification::info("Info", "queued"));

        assert_eq!((a, b, c), (0, 1, 2));
        let titles: Vec<&str> = q.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Success!", "Error", "Info"]);
        assert_eq!(q.last().unwrap().id, 2);
    }

    #[test]
    fn error_toasts_stay_longer() {
        let mut q = ToastQueue::new();
        let ok = q.push_notification(Notification::success("Success!", ""));
        let err = q.push_notification(Notification::error("Error", ""));
        let info = q.push_notification(Notification::info("Info", ""));

        assert_eq!(q.get(ok).unwrap().duration_ms, 4000);
        assert_eq!(q.get(err).unwrap().duration_ms, 6000);
        assert_eq!(q.get(info).unwrap().duration_ms, 4000);
    }

    #[test]
    fn explicit_duration() {
        let mut q = ToastQueue::new();
        let id = q.push(Severity::Info, "Uploading", "scan.pdf", 1500);
        let toast = q.get(id).unwrap();
        assert_eq!(toast.duration_ms, 1500);
        assert_eq!(toast.message, "scan.pdf");
    }

    #[test]
    fn remove_and_clear() {
        let mut q = ToastQueue::new();
        let keep = q.push_notification(Notification::info("keep", ""));
        let drop_me = q.push_notification(Notification::error("drop", ""));

        assert!(q.remove(drop_me));
        assert!(!q.remove(drop_me));
        assert!(q.get(keep).is_some());
        assert_eq!(q.len(), 1);

        q.clear();
        assert!(q.is_empty());
    }

    #[test]
    fn ids_not_reused_after_remove() {
        let mut q = ToastQueue::new();
        let first = q.push_notification(Notification::info("a", ""));
        q.remove(first);
        let second = q.push_notification(Notification::info("b", ""));
        assert_ne!(first, second);
    }
}
