//! Customer notification inbox.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use craftlens_core::NotificationId;
use craftlens_notifications::Notification;

use crate::app::dto::pagination_json;
use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::context::AuthedUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub unread_only: Option<bool>,
}

/// GET /v1/notifications
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(20).clamp(1, 100);
    let now = Utc::now();
    let result = services.notifications.list_for(
        user.0.id,
        query.unread_only.unwrap_or(false),
        page,
        per_page,
        now,
    );

    Json(json!({
        "success": true,
        "notifications": result.items.iter().map(notification_json).collect::<Vec<_>>(),
        "unreadCount": services.notifications.unread_count(user.0.id, now),
        "pagination": pagination_json(page, per_page, result.total),
    }))
    .into_response()
}

/// GET /v1/notifications/unread-count
pub async fn unread_count(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
) -> Response {
    let count = services.notifications.unread_count(user.0.id, Utc::now());
    Json(json!({ "success": true, "unreadCount": count })).into_response()
}

/// POST /v1/notifications/:id/read
pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<NotificationId>,
) -> Response {
    let Some(notification) = services.notifications.mark_as_read(id, user.0.id, Utc::now()) else {
        return json_error(StatusCode::NOT_FOUND, "not_found", "Notification not found");
    };
    Json(json!({ "success": true, "notification": notification_json(&notification) }))
        .into_response()
}

/// POST /v1/notifications/read-all
pub async fn mark_all_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
) -> Response {
    let updated = services.notifications.mark_all_read(user.0.id, Utc::now());
    Json(json!({ "success": true, "updatedCount": updated })).into_response()
}

/// DELETE /v1/notifications/:id
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<NotificationId>,
) -> Response {
    if services.notifications.delete_for(id, user.0.id).is_none() {
        return json_error(StatusCode::NOT_FOUND, "not_found", "Notification not found");
    }
    Json(json!({ "success": true, "message": "Notification deleted" })).into_response()
}

fn notification_json(notification: &Notification) -> Value {
    json!({
        "id": notification.id,
        "kind": notification.kind,
        "title": notification.title,
        "message": notification.message,
        "action": notification.action,
        "priority": notification.priority,
        "isRead": notification.is_read,
        "readAt": notification.read_at,
        "createdAt": notification.created_at,
    })
}
