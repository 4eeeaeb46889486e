//! Notification types for the toast queue.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Notification type categories.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Error => "error",
            NotificationType::Warning => "warning",
            NotificationType::Info => "info",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique notification identifier. Never reused by a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Interactive affordance attached to a notification (e.g. "Undo").
#[derive(Clone)]
pub struct NotificationAction {
    /// Button label.
    pub label: String,
    on_click: Arc<dyn Fn() + Send + Sync>,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_click: Arc::new(on_click),
        }
    }

    /// Run the click handler.
    pub fn trigger(&self) {
        (self.on_click)();
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Serialize for NotificationAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Label<'a> {
            label: &'a str,
        }
        Label { label: &self.label }.serialize(serializer)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// A notification owned by a [`NotificationQueue`](crate::services::NotificationQueue).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification ID
    pub id: NotificationId,
    /// Notification type (success, error, warning, info)
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Short title
    pub title: String,
    /// Optional longer message
    pub message: Option<String>,
    /// Time until auto-removal. Zero means the notification never expires.
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Whether the notification must be dismissed manually
    pub persistent: bool,
    /// False once the notification is on its way out (exit animation)
    pub is_visible: bool,
    /// Creation time, set once
    pub created_at: DateTime<Utc>,
    /// Optional action button
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
    /// When the queue drops this entry, if ever.
    #[serde(skip)]
    pub(crate) deadline: Option<Instant>,
}

impl Notification {
    /// Whether this notification expires on its own.
    pub fn auto_expires(&self) -> bool {
        !self.persistent && !self.duration.is_zero()
    }

    /// Whether the queue has a removal scheduled for this notification.
    pub fn will_expire(&self) -> bool {
        self.deadline.is_some()
    }

    pub(crate) fn is_overdue(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

/// Parameters for `NotificationQueue::add_notification`.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: Option<String>,
    /// `None` applies the per-type default duration.
    pub duration: Option<Duration>,
    pub persistent: bool,
    pub action: Option<NotificationAction>,
}

impl NotificationRequest {
    pub fn new(notification_type: NotificationType, title: impl Into<String>) -> Self {
        Self {
            notification_type,
            title: title.into(),
            message: None,
            duration: None,
            persistent: false,
            action: None,
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    #[must_use]
    pub fn action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Partial update applied by `NotificationQueue::update_notification`.
///
/// Identity, type, creation time and expiry timing are not patchable.
#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the message.
    pub message: Option<Option<String>>,
    /// `Some(None)` clears the action.
    pub action: Option<Option<NotificationAction>>,
}

impl NotificationPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(Some(message.into()));
        self
    }

    #[must_use]
    pub fn clear_message(mut self) -> Self {
        self.message = Some(None);
        self
    }

    #[must_use]
    pub fn action(mut self, action: NotificationAction) -> Self {
        self.action = Some(Some(action));
        self
    }

    #[must_use]
    pub fn clear_action(mut self) -> Self {
        self.action = Some(None);
        self
    }

    pub(crate) fn apply(self, notification: &mut Notification) {
        if let Some(title) = self.title {
            notification.title = title;
        }
        if let Some(message) = self.message {
            notification.message = message;
        }
        if let Some(action) = self.action {
            notification.action = action;
        }
    }
}

/// Why a notification left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalReason {
    /// Removed by an explicit `remove_notification` call.
    Dismissed,
    /// Duration or hide delay elapsed.
    Expired,
    /// Pushed out by a newer notification at capacity.
    Evicted,
    /// Dropped by `clear_all` or `clear_by_type`.
    Cleared,
}

/// Queue lifecycle event, delivered to `NotificationQueue::subscribe` receivers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NotificationEvent {
    Added { notification: Notification },
    Updated { notification: Notification },
    Hidden { id: NotificationId },
    Removed { id: NotificationId, reason: RemovalReason },
}
