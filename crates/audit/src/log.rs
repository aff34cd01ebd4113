//! Activity-log records and the append-only store seam.

use chrono::{DateTime, Utc};
use craftlens_core::{ActivityLogId, DomainResult, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logs younger than this can never be purged.
pub const MIN_PURGE_AGE_DAYS: i64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Vocabulary
// ─────────────────────────────────────────────────────────────────────────────

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    // Authentication
    Login,
    Logout,
    Signup,
    PasswordReset,
    EmailVerification,
    UnauthorizedAccess,
    // User management
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserSuspended,
    UserActivated,
    // Customer management
    SellerCreated,
    SellerUpdated,
    SellerDeleted,
    SellerSuspended,
    SellerActivated,
    SellerPlanChanged,
    SellerVerified,
    // Role management
    RoleCreated,
    RoleUpdated,
    RoleDeleted,
    RoleAssigned,
    // Settings
    SettingsUpdated,
    SystemConfigChanged,
    // Analysis
    AnalysisPerformed,
    AnalysisDeleted,
    // Other
    DataExported,
    BackupCreated,
    SystemMaintenance,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Login => "login",
            ActivityAction::Logout => "logout",
            ActivityAction::Signup => "signup",
            ActivityAction::PasswordReset => "password_reset",
            ActivityAction::EmailVerification => "email_verification",
            ActivityAction::UnauthorizedAccess => "unauthorized_access",
            ActivityAction::UserCreated => "user_created",
            ActivityAction::UserUpdated => "user_updated",
            ActivityAction::UserDeleted => "user_deleted",
            ActivityAction::UserSuspended => "user_suspended",
            ActivityAction::UserActivated => "user_activated",
            ActivityAction::SellerCreated => "seller_created",
            ActivityAction::SellerUpdated => "seller_updated",
            ActivityAction::SellerDeleted => "seller_deleted",
            ActivityAction::SellerSuspended => "seller_suspended",
            ActivityAction::SellerActivated => "seller_activated",
            ActivityAction::SellerPlanChanged => "seller_plan_changed",
            ActivityAction::SellerVerified => "seller_verified",
            ActivityAction::RoleCreated => "role_created",
            ActivityAction::RoleUpdated => "role_updated",
            ActivityAction::RoleDeleted => "role_deleted",
            ActivityAction::RoleAssigned => "role_assigned",
            ActivityAction::SettingsUpdated => "settings_updated",
            ActivityAction::SystemConfigChanged => "system_config_changed",
            ActivityAction::AnalysisPerformed => "analysis_performed",
            ActivityAction::AnalysisDeleted => "analysis_deleted",
            ActivityAction::DataExported => "data_exported",
            ActivityAction::BackupCreated => "backup_created",
            ActivityAction::SystemMaintenance => "system_maintenance",
        }
    }
}

/// Coarse category used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityActionType {
    Create,
    Read,
    Update,
    Delete,
    Auth,
    Export,
    System,
}

impl ActivityActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityActionType::Create => "create",
            ActivityActionType::Read => "read",
            ActivityActionType::Update => "update",
            ActivityActionType::Delete => "delete",
            ActivityActionType::Auth => "auth",
            ActivityActionType::Export => "export",
            ActivityActionType::System => "system",
        }
    }
}

/// Which kind of entity the action touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetModel {
    User,
    CustomRole,
    Analysis,
    Settings,
    Notification,
    System,
}

/// Outcome of the logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Success,
    Failed,
    Warning,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Success => "success",
            ActivityStatus::Failed => "failed",
            ActivityStatus::Warning => "warning",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// Denormalized snapshot of who acted.
///
/// Copied onto the log entry at write time so the trail stays meaningful
/// after the user record is edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl ActorSnapshot {
    /// Actor for failed attempts with no matching account (the nil id).
    pub fn unknown(email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            name: "Unknown".into(),
            email: email.into(),
            role: "unknown".into(),
        }
    }
}

/// The entity the action was aimed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRef {
    pub model: TargetModel,
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

/// Request transport details, when the action came in over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One immutable activity-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub actor: ActorSnapshot,
    pub action: ActivityAction,
    pub action_type: ActivityActionType,
    pub target: Option<TargetRef>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub request: RequestContext,
    pub status: ActivityStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for one audit write. Everything optional defaults to empty.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor: ActorSnapshot,
    pub action: ActivityAction,
    pub action_type: ActivityActionType,
    pub target: Option<TargetRef>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub request: RequestContext,
    pub status: ActivityStatus,
    pub error_message: Option<String>,
}

impl NewActivity {
    pub fn new(
        actor: ActorSnapshot,
        action: ActivityAction,
        action_type: ActivityActionType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            actor,
            action,
            action_type,
            target: None,
            description: description.into(),
            metadata: serde_json::Value::Object(Default::default()),
            request: RequestContext::default(),
            status: ActivityStatus::Success,
            error_message: None,
        }
    }

    pub fn target(mut self, model: TargetModel, id: Option<Uuid>, name: Option<String>) -> Self {
        self.target = Some(TargetRef { model, id, name });
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    pub fn failed(mut self, error_message: impl Into<String>) -> Self {
        self.status = ActivityStatus::Failed;
        self.error_message = Some(error_message.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store seam
// ─────────────────────────────────────────────────────────────────────────────

/// Append-only persistence seam for the audit trail.
pub trait ActivityLogStore: Send + Sync {
    fn append(&self, entry: ActivityLog) -> DomainResult<()>;
}

impl<S: ActivityLogStore + ?Sized> ActivityLogStore for std::sync::Arc<S> {
    fn append(&self, entry: ActivityLog) -> DomainResult<()> {
        (**self).append(entry)
    }
}

/// Write one audit entry, swallowing failures.
///
/// Returns the new entry's id, or `None` if the write failed. Callers never
/// branch on the outcome; audit must not break the operation it describes.
pub fn log_activity<S: ActivityLogStore + ?Sized>(
    store: &S,
    activity: NewActivity,
    now: DateTime<Utc>,
) -> Option<ActivityLogId> {
    let action = activity.action;
    let entry = ActivityLog {
        id: ActivityLogId::new(),
        actor: activity.actor,
        action: activity.action,
        action_type: activity.action_type,
        target: activity.target,
        description: activity.description,
        metadata: activity.metadata,
        request: activity.request,
        status: activity.status,
        error_message: activity.error_message,
        created_at: now,
    };
    let id = entry.id;
    match store.append(entry) {
        Ok(()) => Some(id),
        Err(err) => {
            tracing::warn!(error = %err, action = action.as_str(), "activity log write failed");
            None
        }
    }
}
