//! Admin settings endpoints: one GET for the whole document, one PUT per
//! section. Section PUTs replace the whole section.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, TargetModel, log_activity};
use craftlens_auth::Permission;
use craftlens_settings::{
    AdminSettings, CustomerSettings, EmailSettings, FeatureFlags, MaintenanceMode,
    NotificationSettings, SecuritySettings, ThemeSettings,
};

use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};
use crate::rbac::check_permission;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralBody {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub support_email: Option<String>,
    pub contact_email: Option<String>,
}

/// GET /v1/admin/settings
pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.view")],
        false,
    )?;

    let settings = services.settings.get_or_create(Utc::now());
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/general
pub async fn update_general(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<GeneralBody>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;

    let settings = apply(&services, &user, &meta, "general", move |s| {
        if let Some(site_name) = body.site_name {
            s.site_name = site_name;
        }
        if let Some(site_description) = body.site_description {
            s.site_description = site_description;
        }
        if let Some(support_email) = body.support_email {
            s.support_email = support_email;
        }
        if let Some(contact_email) = body.contact_email {
            s.contact_email = contact_email;
        }
    });
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/email
pub async fn update_email(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<EmailSettings>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "email", move |s| s.email = body);
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/customer
pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<CustomerSettings>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "customer", move |s| s.customer = body);
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/security
pub async fn update_security(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<SecuritySettings>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "security", move |s| s.security = body);
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/notification
pub async fn update_notification(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<NotificationSettings>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "notification", move |s| {
        s.notifications = body;
    });
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/maintenance
pub async fn update_maintenance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<MaintenanceMode>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "maintenance", move |s| {
        s.maintenance = body;
    });
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// PUT /v1/admin/settings/features
pub async fn update_features(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<FeatureFlags>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "features", move |s| s.features = body);
    Ok(Json(json!({ "success": true, "settings": settings })).into_response())
}

/// GET /v1/admin/settings/theme
pub async fn get_theme(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.view")],
        false,
    )?;
    let settings = services.settings.get_or_create(Utc::now());
    Ok(Json(json!({ "success": true, "theme": settings.theme })).into_response())
}

/// PUT /v1/admin/settings/theme
pub async fn update_theme(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<ThemeSettings>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("settings.edit")],
        false,
    )?;
    let settings = apply(&services, &user, &meta, "theme", move |s| s.theme = body);
    Ok(Json(json!({ "success": true, "theme": settings.theme })).into_response())
}

fn apply(
    services: &AppServices,
    user: &AuthedUser,
    meta: &RequestMeta,
    section: &str,
    f: impl FnOnce(&mut AdminSettings),
) -> AdminSettings {
    let now = Utc::now();
    let settings = services.settings.update(now, f);

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::SettingsUpdated,
            ActivityActionType::Update,
            format!("Updated {section} settings"),
        )
        .target(TargetModel::Settings, None, Some(section.to_string()))
        .metadata(json!({ "section": section }))
        .request(meta.request_context()),
        now,
    );
    settings
}
