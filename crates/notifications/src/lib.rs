//! `craftlens-notifications` — in-app notification records.
//!
//! Like the audit trail, notification writes are fire-and-forget side
//! effects of other operations.

pub mod notification;

pub use notification::{
    NewNotification, Notification, NotificationAction, NotificationKind, NotificationStore,
    Priority, RecipientType, SenderRef, create_notification,
};
