//! Settings repository: the fetched-or-created singleton document.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use craftlens_settings::AdminSettings;

use crate::store::InMemoryStore;

/// Keyed by unit: the store holds at most one document.
#[derive(Clone)]
pub struct SettingsRepo {
    store: Arc<InMemoryStore<(), AdminSettings>>,
}

impl SettingsRepo {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }

    /// Fetch the settings document, creating it with defaults on first
    /// access. Atomic, so concurrent first reads create exactly one.
    pub fn get_or_create(&self, now: DateTime<Utc>) -> AdminSettings {
        self.store.with_write(|map| {
            map.entry(())
                .or_insert_with(|| AdminSettings::with_defaults(now))
                .clone()
        })
    }

    /// Apply a mutation to the singleton and return the updated document.
    pub fn update(
        &self,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut AdminSettings),
    ) -> AdminSettings {
        self.store.with_write(|map| {
            let settings = map
                .entry(())
                .or_insert_with(|| AdminSettings::with_defaults(now));
            f(settings);
            settings.touch(now);
            settings.clone()
        })
    }
}

impl Default for SettingsRepo {
    fn default() -> Self {
        Self::new()
    }
}
