//! Analysis-history repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use craftlens_core::{AnalysisId, UserId};
use craftlens_listings::{Analysis, AnalysisStatus};

use crate::repos::activity_logs::Page;
use crate::store::{InMemoryStore, Store};

#[derive(Clone)]
pub struct AnalysesRepo {
    store: Arc<InMemoryStore<AnalysisId, Analysis>>,
}

impl AnalysesRepo {
    pub fn new(store: Arc<InMemoryStore<AnalysisId, Analysis>>) -> Self {
        Self { store }
    }

    pub fn insert(&self, analysis: Analysis) {
        self.store.upsert(analysis.id, analysis);
    }

    /// Owner-scoped fetch.
    pub fn get_for(&self, id: AnalysisId, owner: UserId) -> Option<Analysis> {
        self.store
            .with_read(|map| map.get(&id).filter(|a| a.user_id == owner).cloned())
    }

    /// A customer's history, newest first.
    pub fn list_for(&self, owner: UserId, page: usize, per_page: usize) -> Page<Analysis> {
        let mut matching: Vec<Analysis> = self
            .store
            .with_read(|map| map.values().filter(|a| a.user_id == owner).cloned().collect());
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

    pub fn delete_for(&self, id: AnalysisId, owner: UserId) -> Option<Analysis> {
        self.store.with_write(|map| {
            if map.get(&id).is_some_and(|a| a.user_id == owner) {
                map.remove(&id)
            } else {
                None
            }
        })
    }

    /// Clear a customer's entire history; returns how many were removed.
    pub fn delete_all_for(&self, owner: UserId) -> usize {
        self.store.with_write(|map| {
            let before = map.len();
            map.retain(|_, a| a.user_id != owner);
            before - map.len()
        })
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }

    pub fn count_for(&self, owner: UserId) -> usize {
        self.store
            .with_read(|map| map.values().filter(|a| a.user_id == owner).count())
    }

    pub fn count_with_status(&self, status: AnalysisStatus) -> usize {
        self.store
            .with_read(|map| map.values().filter(|a| a.status == status).count())
    }

    pub fn count_created_since(&self, since: DateTime<Utc>) -> usize {
        self.store
            .with_read(|map| map.values().filter(|a| a.created_at >= since).count())
    }

    /// Mean score over completed analyses, `None` when there are none.
    pub fn average_score(&self) -> Option<f64> {
        self.store.with_read(|map| {
            let scores: Vec<u32> = map
                .values()
                .filter(|a| a.status == AnalysisStatus::Completed)
                .map(|a| u32::from(a.score))
                .collect();
            if scores.is_empty() {
                return None;
            }
            Some(f64::from(scores.iter().sum::<u32>()) / scores.len() as f64)
        })
    }
}
