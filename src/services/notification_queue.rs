//! Notification Queue Service
//!
//! Ordered, capacity-bounded, self-expiring collection of user-facing
//! messages (toasts):
//! - Oldest entries are evicted first once `max_notifications` is exceeded
//! - Each auto-expiring entry owns one tokio timer, aborted on removal
//! - Hidden entries linger for the exit animation, then drop out
//! - Lifecycle events are broadcast to any subscribers
//!
//! Every entry also carries its removal deadline, and reads purge overdue
//! entries, so expiry holds even when no runtime is driving the timers.

use crate::config::{NotificationConfig, MAX_EVENT_CAPACITY};
use crate::types::{
    Notification, NotificationEvent, NotificationId, NotificationPatch, NotificationRequest,
    NotificationType, RemovalReason,
};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Notification queue service.
pub struct NotificationQueue {
    config: NotificationConfig,
    max_notifications: AtomicUsize,
    /// Entries in insertion order (oldest first).
    entries: Mutex<VecDeque<Notification>>,
    /// Pending removal timers (notification ID -> task).
    timers: DashMap<NotificationId, AbortHandle>,
    events: broadcast::Sender<NotificationEvent>,
    /// Handed to timer tasks so they never keep the queue alive.
    this: Weak<NotificationQueue>,
}

impl NotificationQueue {
    /// Create a new notification queue.
    pub fn new(config: NotificationConfig) -> Arc<Self> {
        let (events, _) =
            broadcast::channel(config.event_capacity.clamp(1, MAX_EVENT_CAPACITY));
        Arc::new_cyclic(|this| Self {
            max_notifications: AtomicUsize::new(config.max_notifications),
            config,
            entries: Mutex::new(VecDeque::new()),
            timers: DashMap::new(),
            events,
            this: this.clone(),
        })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Arc<Self> {
        Self::new(NotificationConfig::default())
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    /// Add a notification and return its ID.
    ///
    /// The newest entry is always kept; older entries are evicted until the
    /// queue fits `max_notifications`.
    pub fn add_notification(&self, request: NotificationRequest) -> NotificationId {
        let duration = request
            .duration
            .unwrap_or_else(|| self.config.default_duration(request.notification_type));

        let mut notification = Notification {
            id: NotificationId::new(),
            notification_type: request.notification_type,
            title: request.title,
            message: request.message,
            duration,
            persistent: request.persistent,
            is_visible: true,
            created_at: Utc::now(),
            action: request.action,
            deadline: None,
        };
        if notification.auto_expires() {
            // A duration past the clock's range never expires.
            notification.deadline = Instant::now().checked_add(duration);
        }
        let id = notification.id;

        let evicted = {
            let mut entries = self.entries.lock();
            entries.push_back(notification.clone());
            if let Some(deadline) = notification.deadline {
                self.arm_timer(id, deadline);
            }

            let capacity = self.max_notifications().max(1);
            let mut evicted = Vec::new();
            while entries.len() > capacity {
                if let Some(oldest) = entries.pop_front() {
                    evicted.push(oldest.id);
                }
            }
            evicted
        };

        debug!(
            "Added {} notification {} ({:?}, persistent={})",
            notification.notification_type, id, duration, notification.persistent
        );
        self.emit(NotificationEvent::Added { notification });

        for old in evicted {
            self.cancel_timer(old);
            debug!("Evicted notification {}", old);
            self.emit(NotificationEvent::Removed {
                id: old,
                reason: RemovalReason::Evicted,
            });
        }

        id
    }

    /// Add a success notification.
    pub fn success(
        &self,
        title: impl Into<String>,
        message: Option<&str>,
        duration: Option<Duration>,
    ) -> NotificationId {
        self.add_typed(NotificationType::Success, title, message, duration)
    }

    /// Add an error notification.
    pub fn error(
        &self,
        title: impl Into<String>,
        message: Option<&str>,
        duration: Option<Duration>,
    ) -> NotificationId {
        self.add_typed(NotificationType::Error, title, message, duration)
    }

    /// Add a warning notification.
    pub fn warning(
        &self,
        title: impl Into<String>,
        message: Option<&str>,
        duration: Option<Duration>,
    ) -> NotificationId {
        self.add_typed(NotificationType::Warning, title, message, duration)
    }

    /// Add an info notification.
    pub fn info(
        &self,
        title: impl Into<String>,
        message: Option<&str>,
        duration: Option<Duration>,
    ) -> NotificationId {
        self.add_typed(NotificationType::Info, title, message, duration)
    }

    fn add_typed(
        &self,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: Option<&str>,
        duration: Option<Duration>,
    ) -> NotificationId {
        let mut request = NotificationRequest::new(notification_type, title);
        request.message = message.map(str::to_string);
        request.duration = duration;
        self.add_notification(request)
    }

    /// Remove a notification. Returns `false` if it was not present.
    pub fn remove_notification(&self, id: NotificationId) -> bool {
        self.take(id, RemovalReason::Dismissed).is_some()
    }

    /// Mark a notification invisible and remove it after the hide delay.
    ///
    /// A pending expiry that falls earlier than the hide delay still wins.
    pub fn hide_notification(&self, id: NotificationId) {
        {
            let mut entries = self.entries.lock();
            let Some(notification) = entries.iter_mut().find(|n| n.id == id) else {
                return;
            };
            if !notification.is_visible {
                return;
            }
            notification.is_visible = false;

            let hide_deadline = Instant::now().checked_add(self.config.hide_delay);
            let deadline = match (notification.deadline, hide_deadline) {
                (Some(expiry), Some(hide)) => Some(expiry.min(hide)),
                (expiry, hide) => expiry.or(hide),
            };
            if deadline != notification.deadline {
                notification.deadline = deadline;
                if let Some(deadline) = deadline {
                    self.arm_timer(id, deadline);
                }
            }
        }

        debug!("Hid notification {}", id);
        self.emit(NotificationEvent::Hidden { id });
    }

    /// Patch a notification in place. Returns `false` if it was not present.
    pub fn update_notification(&self, id: NotificationId, patch: NotificationPatch) -> bool {
        let updated = {
            let mut entries = self.entries.lock();
            let Some(notification) = entries.iter_mut().find(|n| n.id == id) else {
                return false;
            };
            patch.apply(notification);
            notification.clone()
        };

        self.emit(NotificationEvent::Updated {
            notification: updated,
        });
        true
    }

    /// Remove every notification.
    pub fn clear_all(&self) {
        let removed: Vec<NotificationId> = self.entries.lock().drain(..).map(|n| n.id).collect();
        debug!("Cleared {} notifications", removed.len());
        self.drop_removed(removed, RemovalReason::Cleared);
    }

    /// Remove every notification of the given type.
    pub fn clear_by_type(&self, notification_type: NotificationType) {
        let removed = self.extract(|n| n.notification_type == notification_type);
        debug!("Cleared {} {} notifications", removed.len(), notification_type);
        self.drop_removed(removed, RemovalReason::Cleared);
    }

    /// Change the capacity for future insertions. The current queue is not trimmed.
    pub fn set_max_notifications(&self, max: usize) {
        self.max_notifications.store(max, Ordering::Relaxed);
        debug!("Max notifications set to {}", max);
    }

    /// Current capacity.
    pub fn max_notifications(&self) -> usize {
        self.max_notifications.load(Ordering::Relaxed)
    }

    /// Remove entries whose deadline has passed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let removed = self.extract(|n| n.is_overdue(now));
        let count = removed.len();
        self.drop_removed(removed, RemovalReason::Expired);
        count
    }

    /// All notifications, oldest first, including ones being hidden.
    pub fn notifications(&self) -> Vec<Notification> {
        self.purge_expired();
        self.entries.lock().iter().cloned().collect()
    }

    /// Notifications to display, oldest first.
    pub fn visible(&self) -> Vec<Notification> {
        self.purge_expired();
        self.entries
            .lock()
            .iter()
            .filter(|n| n.is_visible)
            .cloned()
            .collect()
    }

    /// Look up a notification by ID.
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.purge_expired();
        self.entries.lock().iter().find(|n| n.id == id).cloned()
    }

    /// Number of notifications in the queue, hidden ones included.
    pub fn len(&self) -> usize {
        self.purge_expired();
        self.entries.lock().len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&self, id: NotificationId, reason: RemovalReason) -> Option<Notification> {
        let removed = {
            let mut entries = self.entries.lock();
            let position = entries.iter().position(|n| n.id == id)?;
            entries.remove(position)?
        };
        self.cancel_timer(id);

        debug!("Removed notification {} ({:?})", id, reason);
        self.emit(NotificationEvent::Removed { id, reason });
        Some(removed)
    }

    fn extract(&self, predicate: impl Fn(&Notification) -> bool) -> Vec<NotificationId> {
        let mut entries = self.entries.lock();
        let mut removed = Vec::new();
        entries.retain(|n| {
            if predicate(n) {
                removed.push(n.id);
                false
            } else {
                true
            }
        });
        removed
    }

    fn drop_removed(&self, removed: Vec<NotificationId>, reason: RemovalReason) {
        for id in removed {
            self.cancel_timer(id);
            self.emit(NotificationEvent::Removed { id, reason });
        }
    }

    /// Schedule removal at `deadline`, replacing any earlier timer for `id`.
    ///
    /// Called with the entries lock held so a firing timer cannot race the
    /// handle insertion.
    fn arm_timer(&self, id: NotificationId, deadline: Instant) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                "No tokio runtime; notification {} will be purged on next read",
                id
            );
            return;
        };

        let queue = self.this.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(queue) = queue.upgrade() {
                queue.take(id, RemovalReason::Expired);
            }
        });

        if let Some(previous) = self.timers.insert(id, task.abort_handle()) {
            previous.abort();
        }
    }

    fn cancel_timer(&self, id: NotificationId) {
        if let Some((_, timer)) = self.timers.remove(&id) {
            timer.abort();
        }
    }

    fn emit(&self, event: NotificationEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        for timer in self.timers.iter() {
            timer.abort();
        }
    }
}
