//! `craftlens-settings` — the platform-wide admin settings document.

pub mod admin_settings;

pub use admin_settings::{
    AdminSettings, AnalyticsSettings, CustomerSettings, EmailSettings, FeatureFlags,
    MaintenanceMode, NotificationSettings, SecuritySettings, ThemeSettings,
};
