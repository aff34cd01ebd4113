//! Typed repositories over the document store.

pub mod activity_logs;
pub mod analyses;
pub mod notifications;
pub mod roles;
pub mod settings;
pub mod users;

pub use activity_logs::{ActivityLogsRepo, LogFilter, LogStats, Page};
pub use analyses::AnalysesRepo;
pub use notifications::NotificationsRepo;
pub use roles::RolesRepo;
pub use settings::SettingsRepo;
pub use users::{ConsumeQuotaError, UserFilter, UsersRepo};
