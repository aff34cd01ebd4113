//! Activity-log repository: append, query, stats, purge, CSV export.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use craftlens_audit::{
    ActivityAction, ActivityActionType, ActivityLog, ActivityLogStore, ActivityStatus,
};
use craftlens_core::{ActivityLogId, DomainResult, UserId};

use crate::store::{InMemoryStore, Store};

/// Query filter for log listings and exports.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub user_id: Option<UserId>,
    pub action: Option<ActivityAction>,
    pub action_type: Option<ActivityActionType>,
    pub status: Option<ActivityStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl LogFilter {
    fn matches(&self, entry: &ActivityLog) -> bool {
        if self.user_id.is_some_and(|id| entry.actor.user_id != id) {
            return false;
        }
        if self.action.is_some_and(|a| entry.action != a) {
            return false;
        }
        if self.action_type.is_some_and(|t| entry.action_type != t) {
            return false;
        }
        if self.status.is_some_and(|s| entry.status != s) {
            return false;
        }
        if self.from.is_some_and(|from| entry.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.created_at > to) {
            return false;
        }
        true
    }
}

/// One page of results plus the pre-paging total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Global log counters for the logs dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub warning: usize,
}

#[derive(Clone)]
pub struct ActivityLogsRepo {
    store: Arc<InMemoryStore<ActivityLogId, ActivityLog>>,
}

impl ActivityLogsRepo {
    pub fn new(store: Arc<InMemoryStore<ActivityLogId, ActivityLog>>) -> Self {
        Self { store }
    }

    pub fn get(&self, id: ActivityLogId) -> Option<ActivityLog> {
        self.store.with_read(|map| map.get(&id).cloned())
    }

    /// Filtered listing, newest first.
    pub fn list(&self, filter: &LogFilter, page: usize, per_page: usize) -> Page<ActivityLog> {
        let mut matching: Vec<ActivityLog> = self
            .store
            .with_read(|map| map.values().filter(|e| filter.matches(e)).cloned().collect());
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

    pub fn count(&self, filter: &LogFilter) -> usize {
        self.store
            .with_read(|map| map.values().filter(|e| filter.matches(e)).count())
    }

    pub fn stats(&self) -> LogStats {
        self.store.with_read(|map| {
            let mut stats = LogStats {
                total: map.len(),
                success: 0,
                failed: 0,
                warning: 0,
            };
            for entry in map.values() {
                match entry.status {
                    ActivityStatus::Success => stats.success += 1,
                    ActivityStatus::Failed => stats.failed += 1,
                    ActivityStatus::Warning => stats.warning += 1,
                }
            }
            stats
        })
    }

    /// Count of entries per action type since `since`, sorted by the map key.
    pub fn action_type_breakdown(&self, since: DateTime<Utc>) -> BTreeMap<&'static str, usize> {
        self.store.with_read(|map| {
            let mut out = BTreeMap::new();
            for entry in map.values().filter(|e| e.created_at >= since) {
                *out.entry(entry.action_type.as_str()).or_insert(0) += 1;
            }
            out
        })
    }

    /// Most frequent actions since `since`, descending, capped at `limit`.
    pub fn top_actions(&self, since: DateTime<Utc>, limit: usize) -> Vec<(&'static str, usize)> {
        let counts = self.store.with_read(|map| {
            let mut out: BTreeMap<&'static str, usize> = BTreeMap::new();
            for entry in map.values().filter(|e| e.created_at >= since) {
                *out.entry(entry.action.as_str()).or_insert(0) += 1;
            }
            out
        });
        let mut pairs: Vec<_> = counts.into_iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        pairs.truncate(limit);
        pairs
    }

    /// Delete entries older than `days` days. The caller enforces the
    /// minimum-age floor before calling; this method only applies the cutoff.
    pub fn purge_older_than(&self, days: i64, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(days);
        self.store.with_write(|map| {
            let before = map.len();
            map.retain(|_, entry| entry.created_at >= cutoff);
            before - map.len()
        })
    }

    /// Render entries as CSV, matching the dashboard export format.
    pub fn to_csv(entries: &[ActivityLog]) -> String {
        let mut csv = String::from(
            "Date,User Name,User Email,User Role,Action,Action Type,Description,Status,IP Address\n",
        );
        for entry in entries {
            let row = [
                entry.created_at.to_rfc3339(),
                entry.actor.name.clone(),
                entry.actor.email.clone(),
                entry.actor.role.clone(),
                entry.action.as_str().to_string(),
                entry.action_type.as_str().to_string(),
                entry.description.clone(),
                entry.status.as_str().to_string(),
                entry.request.ip_address.clone().unwrap_or_default(),
            ];
            let escaped: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
            csv.push_str(&escaped.join(","));
            csv.push('\n');
        }
        csv
    }
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl ActivityLogStore for ActivityLogsRepo {
    fn append(&self, entry: ActivityLog) -> DomainResult<()> {
        self.store.upsert(entry.id, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftlens_audit::{ActorSnapshot, RequestContext};

    fn repo() -> ActivityLogsRepo {
        ActivityLogsRepo::new(Arc::new(InMemoryStore::new()))
    }

    fn entry(
        action: ActivityAction,
        action_type: ActivityActionType,
        status: ActivityStatus,
        created_at: DateTime<Utc>,
    ) -> ActivityLog {
        ActivityLog {
            id: ActivityLogId::new(),
            actor: ActorSnapshot {
                user_id: UserId::new(),
                name: "Ops".into(),
                email: "ops@example.com".into(),
                role: "admin".into(),
            },
            action,
            action_type,
            target: None,
            description: format!("{} happened", action.as_str()),
            metadata: serde_json::Value::Null,
            request: RequestContext::default(),
            status,
            error_message: None,
            created_at,
        }
    }

    #[test]
    fn list_is_newest_first_and_filtered() {
        let repo = repo();
        let now = Utc::now();
        repo.append(entry(
            ActivityAction::Login,
            ActivityActionType::Auth,
            ActivityStatus::Success,
            now - Duration::hours(2),
        ))
        .unwrap();
        repo.append(entry(
            ActivityAction::UserCreated,
            ActivityActionType::Create,
            ActivityStatus::Success,
            now - Duration::hours(1),
        ))
        .unwrap();
        repo.append(entry(
            ActivityAction::Login,
            ActivityActionType::Auth,
            ActivityStatus::Failed,
            now,
        ))
        .unwrap();

        let page = repo.list(&LogFilter::default(), 1, 10);
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].created_at, now);

        let filter = LogFilter {
            action: Some(ActivityAction::Login),
            status: Some(ActivityStatus::Failed),
            ..Default::default()
        };
        let page = repo.list(&filter, 1, 10);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn stats_count_by_status() {
        let repo = repo();
        let now = Utc::now();
        for status in [
            ActivityStatus::Success,
            ActivityStatus::Success,
            ActivityStatus::Failed,
            ActivityStatus::Warning,
        ] {
            repo.append(entry(
                ActivityAction::Login,
                ActivityActionType::Auth,
                status,
                now,
            ))
            .unwrap();
        }
        let stats = repo.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.warning, 1);
    }

    #[test]
    fn purge_respects_cutoff() {
        let repo = repo();
        let now = Utc::now();
        repo.append(entry(
            ActivityAction::Login,
            ActivityActionType::Auth,
            ActivityStatus::Success,
            now - Duration::days(100),
        ))
        .unwrap();
        repo.append(entry(
            ActivityAction::Login,
            ActivityActionType::Auth,
            ActivityStatus::Success,
            now - Duration::days(10),
        ))
        .unwrap();

        let deleted = repo.purge_older_than(90, now);
        assert_eq!(deleted, 1);
        assert_eq!(repo.stats().total, 1);
    }

    #[test]
    fn csv_escapes_embedded_commas_and_quotes() {
        let now = Utc::now();
        let mut e = entry(
            ActivityAction::SettingsUpdated,
            ActivityActionType::Update,
            ActivityStatus::Success,
            now,
        );
        e.description = "changed \"siteName\", twice".into();

        let csv = ActivityLogsRepo::to_csv(&[e]);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("Date,User Name"));
        assert!(lines
            .next()
            .unwrap()
            .contains("\"changed \"\"siteName\"\", twice\""));
    }

    #[test]
    fn top_actions_orders_by_count() {
        let repo = repo();
        let now = Utc::now();
        for _ in 0..3 {
            repo.append(entry(
                ActivityAction::Login,
                ActivityActionType::Auth,
                ActivityStatus::Success,
                now,
            ))
            .unwrap();
        }
        repo.append(entry(
            ActivityAction::UserCreated,
            ActivityActionType::Create,
            ActivityStatus::Success,
            now,
        ))
        .unwrap();

        let top = repo.top_actions(now - Duration::days(1), 10);
        assert_eq!(top[0], ("login", 3));
        assert_eq!(top[1], ("user_created", 1));
    }

    #[test]
    fn append_never_overwrites_silently() {
        // ids are v7 uuids; two appends land as two rows
        let repo = repo();
        let now = Utc::now();
        repo.append(entry(
            ActivityAction::Login,
            ActivityActionType::Auth,
            ActivityStatus::Success,
            now,
        ))
        .unwrap();
        repo.append(entry(
            ActivityAction::Login,
            ActivityActionType::Auth,
            ActivityStatus::Success,
            now,
        ))
        .unwrap();
        assert_eq!(repo.store.len(), 2);
    }
}
