//! Notification repository.
//!
//! There is no TTL machinery in the in-memory store; expiry is applied on
//! every read path and expired rows are dropped opportunistically, which is
//! observationally the same for API consumers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use craftlens_core::{DomainResult, NotificationId, UserId};
use craftlens_notifications::{Notification, NotificationStore};

use crate::repos::activity_logs::Page;
use crate::store::{InMemoryStore, Store};

#[derive(Clone)]
pub struct NotificationsRepo {
    store: Arc<InMemoryStore<NotificationId, Notification>>,
}

impl NotificationsRepo {
    pub fn new(store: Arc<InMemoryStore<NotificationId, Notification>>) -> Self {
        Self { store }
    }

    /// A recipient's notifications, newest first, expired rows excluded.
    pub fn list_for(
        &self,
        recipient: UserId,
        unread_only: bool,
        page: usize,
        per_page: usize,
        now: DateTime<Utc>,
    ) -> Page<Notification> {
        self.purge_expired(now);
        let mut matching: Vec<Notification> = self.store.with_read(|map| {
            map.values()
                .filter(|n| n.recipient_id == recipient && (!unread_only || !n.is_read))
                .cloned()
                .collect()
        });
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len();
        let page = page.max(1);
        let items = matching
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();
        Page { items, total }
    }

    pub fn unread_count(&self, recipient: UserId, now: DateTime<Utc>) -> usize {
        self.store.with_read(|map| {
            map.values()
                .filter(|n| n.recipient_id == recipient && !n.is_read && !n.is_expired(now))
                .count()
        })
    }

    /// Mark one notification read. Owner-scoped; `None` when the id does
    /// not exist or belongs to someone else.
    pub fn mark_as_read(
        &self,
        id: NotificationId,
        recipient: UserId,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        self.store.with_write(|map| {
            let n = map.get_mut(&id).filter(|n| n.recipient_id == recipient)?;
            n.mark_as_read(now);
            Some(n.clone())
        })
    }

    pub fn mark_all_read(&self, recipient: UserId, now: DateTime<Utc>) -> usize {
        self.store.with_write(|map| {
            let mut updated = 0;
            for n in map
                .values_mut()
                .filter(|n| n.recipient_id == recipient && !n.is_read)
            {
                n.mark_as_read(now);
                updated += 1;
            }
            updated
        })
    }

    pub fn delete_for(&self, id: NotificationId, recipient: UserId) -> Option<Notification> {
        self.store.with_write(|map| {
            if map.get(&id).is_some_and(|n| n.recipient_id == recipient) {
                map.remove(&id)
            } else {
                None
            }
        })
    }

    /// Drop expired rows; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.store.with_write(|map| {
            let before = map.len();
            map.retain(|_, n| !n.is_expired(now));
            before - map.len()
        })
    }
}

impl NotificationStore for NotificationsRepo {
    fn insert(&self, notification: Notification) -> DomainResult<()> {
        self.store.upsert(notification.id, notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use craftlens_notifications::{NewNotification, NotificationKind, create_notification};

    fn repo() -> NotificationsRepo {
        NotificationsRepo::new(Arc::new(InMemoryStore::new()))
    }

    fn notify(repo: &NotificationsRepo, recipient: UserId, now: DateTime<Utc>) -> NotificationId {
        create_notification(
            repo,
            NewNotification::new(recipient, NotificationKind::Welcome, "Welcome", "Hello"),
            now,
        )
        .unwrap()
    }

    #[test]
    fn listing_is_owner_scoped() {
        let repo = repo();
        let now = Utc::now();
        let alice = UserId::new();
        let bob = UserId::new();
        notify(&repo, alice, now);
        notify(&repo, alice, now);
        notify(&repo, bob, now);

        assert_eq!(repo.list_for(alice, false, 1, 10, now).total, 2);
        assert_eq!(repo.list_for(bob, false, 1, 10, now).total, 1);
    }

    #[test]
    fn mark_as_read_updates_unread_count() {
        let repo = repo();
        let now = Utc::now();
        let alice = UserId::new();
        let id = notify(&repo, alice, now);
        notify(&repo, alice, now);
        assert_eq!(repo.unread_count(alice, now), 2);

        repo.mark_as_read(id, alice, now).unwrap();
        assert_eq!(repo.unread_count(alice, now), 1);

        // re-reading stays idempotent
        let again = repo.mark_as_read(id, alice, now + Duration::hours(1)).unwrap();
        assert_eq!(again.read_at, Some(now));
    }

    #[test]
    fn foreign_notifications_are_invisible() {
        let repo = repo();
        let now = Utc::now();
        let alice = UserId::new();
        let bob = UserId::new();
        let id = notify(&repo, alice, now);

        assert!(repo.mark_as_read(id, bob, now).is_none());
        assert!(repo.delete_for(id, bob).is_none());
        assert!(repo.delete_for(id, alice).is_some());
    }

    #[test]
    fn expired_rows_disappear_from_reads() {
        let repo = repo();
        let now = Utc::now();
        let alice = UserId::new();
        create_notification(
            &repo,
            NewNotification::new(alice, NotificationKind::NewFeature, "t", "m")
                .expires_at(now + Duration::hours(1)),
            now,
        )
        .unwrap();

        assert_eq!(repo.unread_count(alice, now), 1);
        let later = now + Duration::hours(2);
        assert_eq!(repo.unread_count(alice, later), 0);
        assert_eq!(repo.list_for(alice, false, 1, 10, later).total, 0);
    }

    #[test]
    fn mark_all_read() {
        let repo = repo();
        let now = Utc::now();
        let alice = UserId::new();
        notify(&repo, alice, now);
        notify(&repo, alice, now);

        assert_eq!(repo.mark_all_read(alice, now), 2);
        assert_eq!(repo.unread_count(alice, now), 0);
        assert_eq!(repo.mark_all_read(alice, now), 0);
    }
}
