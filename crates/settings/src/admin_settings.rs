//! Admin settings document.
//!
//! Exactly one instance exists per deployment; the repository creates it
//! with defaults on first access. Section updates replace whole sections so
//! partial writes cannot leave a section half-updated.

use chrono::{DateTime, Utc};
use craftlens_identity::Plan;
use serde::{Deserialize, Serialize};

/// Branding and frontend theme knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub app_name: String,
    pub app_tagline: String,
    pub app_description: String,
    pub logo_url: String,
    pub logo_small_url: String,
    pub favicon_url: String,
    pub primary_service: String,
    pub secondary_service: String,
    pub target_platform: String,
    pub tool_type: String,
    pub welcome_title: String,
    pub welcome_message: String,
    pub email_verification_message: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            app_name: "CraftLens".into(),
            app_tagline: "Your Listing Optimization Platform".into(),
            app_description: "AI-powered Etsy listing optimization".into(),
            logo_url: String::new(),
            logo_small_url: String::new(),
            favicon_url: String::new(),
            primary_service: "SEO".into(),
            secondary_service: "Optimization".into(),
            target_platform: "Etsy".into(),
            tool_type: "AI Agent".into(),
            welcome_title: "Welcome to {APP_NAME}!".into(),
            welcome_message: "Thank you for joining {APP_NAME}. Please verify your email to get started."
                .into(),
            email_verification_message: "Please verify your email to start using our platform."
                .into(),
            primary_color: "#7C3AED".into(),
            secondary_color: "#3B82F6".into(),
            accent_color: "#10B981".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
    pub from_name: String,
    pub subject_prefix: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_password: None,
            from_email: None,
            from_name: "CraftLens Team".into(),
            subject_prefix: "[CraftLens]".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerSettings {
    pub require_email_verification: bool,
    pub allow_temporary_emails: bool,
    pub auto_approve_new_customers: bool,
    pub default_plan: Plan,
    pub free_trial_days: u32,
}

impl Default for CustomerSettings {
    fn default() -> Self {
        Self {
            require_email_verification: true,
            allow_temporary_emails: false,
            auto_approve_new_customers: true,
            default_plan: Plan::Free,
            free_trial_days: 0,
        }
    }
}

/// Security thresholds surfaced in the admin UI.
///
/// Informational today: the lockout policy and token TTL are compiled in,
/// and these values mirror them for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub max_login_attempts: u32,
    pub lockout_duration_ms: u64,
    pub password_min_length: u32,
    pub require_strong_password: bool,
    pub session_timeout_ms: u64,
    pub two_factor_enabled: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            max_login_attempts: 5,
            lockout_duration_ms: 2 * 60 * 60 * 1000,
            password_min_length: 8,
            require_strong_password: true,
            session_timeout_ms: 7 * 24 * 60 * 60 * 1000,
            two_factor_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub enable_tracking: bool,
    pub data_retention_days: u32,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            enable_tracking: true,
            data_retention_days: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enable_email_notifications: bool,
    pub enable_push_notifications: bool,
    pub notify_admin_on_new_customer: bool,
    pub notify_admin_on_subscription: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enable_email_notifications: true,
            enable_push_notifications: false,
            notify_admin_on_new_customer: true,
            notify_admin_on_subscription: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceMode {
    pub enabled: bool,
    pub message: String,
    pub allow_admin_access: bool,
}

impl Default for MaintenanceMode {
    fn default() -> Self {
        Self {
            enabled: false,
            message: "We are currently performing maintenance. Please check back soon.".into(),
            allow_admin_access: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub enable_analysis: bool,
    pub enable_subscriptions: bool,
    pub enable_custom_roles: bool,
    pub enable_activity_logs: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_analysis: true,
            enable_subscriptions: true,
            enable_custom_roles: true,
            enable_activity_logs: true,
        }
    }
}

/// The singleton settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSettings {
    pub theme: ThemeSettings,
    pub site_name: String,
    pub site_description: String,
    pub support_email: String,
    pub contact_email: String,
    pub email: EmailSettings,
    pub customer: CustomerSettings,
    pub security: SecuritySettings,
    pub analytics: AnalyticsSettings,
    pub notifications: NotificationSettings,
    pub maintenance: MaintenanceMode,
    pub features: FeatureFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminSettings {
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            theme: ThemeSettings::default(),
            site_name: "CraftLens".into(),
            site_description: "AI-powered Etsy listing optimization".into(),
            support_email: "support@example.com".into(),
            contact_email: "contact@example.com".into(),
            email: EmailSettings::default(),
            customer: CustomerSettings::default(),
            security: SecuritySettings::default(),
            analytics: AnalyticsSettings::default(),
            notifications: NotificationSettings::default(),
            maintenance: MaintenanceMode::default(),
            features: FeatureFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
