//! Notification record and writer.

use chrono::{DateTime, Utc};
use craftlens_core::{DomainResult, NotificationId, UserId};
use serde::{Deserialize, Serialize};

/// What the notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    EmailVerification,
    PasswordReset,
    SubscriptionActivated,
    SubscriptionExpired,
    SubscriptionCancelled,
    PlanUpgraded,
    PlanDowngraded,
    AnalysisLimitReached,
    AccountSuspended,
    AccountActivated,
    NewFeature,
    SystemAlert,
    AdminMessage,
    SecurityAlert,
}

/// Which audience the notification targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    #[default]
    Customer,
    Admin,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Optional call-to-action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    pub url: String,
}

/// Who sent it, for admin messages. Absent means "System".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRef {
    pub sender_id: UserId,
    pub sender_name: String,
}

/// One in-app notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub recipient_type: RecipientType,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub priority: Priority,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub sender: Option<SenderRef>,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Mark read. Idempotent: re-reading keeps the original `read_at`.
    pub fn mark_as_read(&mut self, now: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(now);
        }
    }

    /// Whether the notification has passed its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Input for one notification write.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub recipient_type: RecipientType,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub priority: Priority,
    pub sender: Option<SenderRef>,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewNotification {
    pub fn new(
        recipient_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            recipient_type: RecipientType::default(),
            kind,
            title: title.into(),
            message: message.into(),
            action: None,
            priority: Priority::default(),
            sender: None,
            metadata: serde_json::Value::Object(Default::default()),
            expires_at: None,
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn recipient_type(mut self, recipient_type: RecipientType) -> Self {
        self.recipient_type = recipient_type;
        self
    }

    pub fn action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.action = Some(NotificationAction {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    pub fn sender(mut self, sender_id: UserId, sender_name: impl Into<String>) -> Self {
        self.sender = Some(SenderRef {
            sender_id,
            sender_name: sender_name.into(),
        });
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// Persistence seam for notifications.
pub trait NotificationStore: Send + Sync {
    fn insert(&self, notification: Notification) -> DomainResult<()>;
}

impl<S: NotificationStore + ?Sized> NotificationStore for std::sync::Arc<S> {
    fn insert(&self, notification: Notification) -> DomainResult<()> {
        (**self).insert(notification)
    }
}

/// Write one notification, swallowing failures.
///
/// Same contract as the audit writer: a notification that fails to persist
/// must never fail the request that produced it.
pub fn create_notification<S: NotificationStore + ?Sized>(
    store: &S,
    new: NewNotification,
    now: DateTime<Utc>,
) -> Option<NotificationId> {
    let kind = new.kind;
    let notification = Notification {
        id: NotificationId::new(),
        recipient_id: new.recipient_id,
        recipient_type: new.recipient_type,
        kind: new.kind,
        title: new.title,
        message: new.message,
        action: new.action,
        priority: new.priority,
        is_read: false,
        read_at: None,
        sender: new.sender,
        metadata: new.metadata,
        expires_at: new.expires_at,
        created_at: now,
    };
    let id = notification.id;
    match store.insert(notification) {
        Ok(()) => Some(id),
        Err(err) => {
            tracing::warn!(error = %err, kind = ?kind, "notification write failed");
            None
        }
    }
}
