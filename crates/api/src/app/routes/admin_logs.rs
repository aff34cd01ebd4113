//! Activity-log browsing, export, and retention.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use craftlens_audit::{
    ActivityAction, ActivityActionType, ActivityLog, ActivityStatus, MIN_PURGE_AGE_DAYS,
    NewActivity, log_activity,
};
use craftlens_auth::Permission;
use craftlens_core::{ActivityLogId, UserId};
use craftlens_infra::repos::{ActivityLogsRepo, LogFilter};

use crate::app::dto::pagination_json;
use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};
use crate::rbac::check_permission;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub action: Option<String>,
    pub action_type: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<UserId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub timeframe: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PurgeBody {
    pub days: Option<i64>,
}

/// GET /v1/admin/logs
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("logs.view")],
        false,
    )?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(50).clamp(1, 200);
    let filter = build_filter(&query)?;
    let result = services.activity_logs.list(&filter, page, per_page);
    let stats = services.activity_logs.stats();

    Ok(Json(json!({
        "success": true,
        "logs": result.items.iter().map(log_json).collect::<Vec<_>>(),
        "stats": {
            "totalLogs": stats.total,
            "successLogs": stats.success,
            "failedLogs": stats.failed,
            "warningLogs": stats.warning,
        },
        "pagination": pagination_json(page, per_page, result.total),
    }))
    .into_response())
}

/// GET /v1/admin/logs/user/:id
pub async fn for_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("logs.view")],
        false,
    )?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(50).clamp(1, 200);
    let filter = LogFilter {
        user_id: Some(id),
        ..Default::default()
    };
    let result = services.activity_logs.list(&filter, page, per_page);

    Ok(Json(json!({
        "success": true,
        "logs": result.items.iter().map(log_json).collect::<Vec<_>>(),
        "pagination": pagination_json(page, per_page, result.total),
    }))
    .into_response())
}

/// GET /v1/admin/logs/stats/summary
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("logs.view")],
        false,
    )?;

    let timeframe = query.timeframe.as_deref().unwrap_or("7d");
    let days = match timeframe {
        "7d" => 7,
        "30d" => 30,
        "90d" => 90,
        other => {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("unknown timeframe: {other}"),
            ));
        }
    };
    let since = Utc::now() - Duration::days(days);

    let breakdown: Vec<Value> = services
        .activity_logs
        .action_type_breakdown(since)
        .into_iter()
        .map(|(action_type, count)| json!({ "actionType": action_type, "count": count }))
        .collect();
    let top: Vec<Value> = services
        .activity_logs
        .top_actions(since, 10)
        .into_iter()
        .map(|(action, count)| json!({ "action": action, "count": count }))
        .collect();
    let in_window = |status| {
        services.activity_logs.count(&LogFilter {
            status: Some(status),
            from: Some(since),
            ..Default::default()
        })
    };

    Ok(Json(json!({
        "success": true,
        "summary": {
            "timeframe": timeframe,
            "actionTypeBreakdown": breakdown,
            "topActions": top,
            "statusDistribution": {
                "success": in_window(ActivityStatus::Success),
                "failed": in_window(ActivityStatus::Failed),
                "warning": in_window(ActivityStatus::Warning),
            },
        },
    }))
    .into_response())
}

/// GET /v1/admin/logs/export/csv
pub async fn export_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Query(query): Query<ListQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("logs.export")],
        false,
    )?;

    let filter = build_filter(&query)?;
    let result = services.activity_logs.list(&filter, 1, usize::MAX);
    let csv = ActivityLogsRepo::to_csv(&result.items);

    let now = Utc::now();
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::DataExported,
            ActivityActionType::Export,
            format!("Exported {} activity log entries to CSV", result.items.len()),
        )
        .metadata(json!({ "exportedCount": result.items.len() }))
        .request(meta.request_context()),
        now,
    );

    let filename = format!("activity-logs-{}.csv", now.format("%Y-%m-%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// DELETE /v1/admin/logs/old
pub async fn purge(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    body: Option<Json<PurgeBody>>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("logs.delete")],
        false,
    )?;

    let days = body.and_then(|Json(b)| b.days).unwrap_or(90);
    if days < MIN_PURGE_AGE_DAYS {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("Cannot delete logs newer than {MIN_PURGE_AGE_DAYS} days"),
        ));
    }

    let now = Utc::now();
    let deleted = services.activity_logs.purge_older_than(days, now);
    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::SystemMaintenance,
            ActivityActionType::Delete,
            format!("Purged activity logs older than {days} days"),
        )
        .metadata(json!({ "deletedCount": deleted, "olderThanDays": days }))
        .request(meta.request_context()),
        now,
    );

    Ok(Json(json!({ "success": true, "deletedCount": deleted })).into_response())
}

/// GET /v1/admin/logs/:id
pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<ActivityLogId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("logs.view")],
        false,
    )?;

    let entry = services
        .activity_logs
        .get(id)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "not_found", "Log entry not found"))?;
    Ok(Json(json!({ "success": true, "log": log_json(&entry) })).into_response())
}

fn build_filter(query: &ListQuery) -> Result<LogFilter, Response> {
    Ok(LogFilter {
        user_id: query.user_id,
        action: parse_filter_value(query.action.as_deref(), "action")?,
        action_type: parse_filter_value(query.action_type.as_deref(), "actionType")?,
        status: parse_filter_value(query.status.as_deref(), "status")?,
        from: query.start_date,
        to: query.end_date,
    })
}

/// Parse a snake_case query value into one of the log enums; unknown values
/// are a 400 rather than silently matching nothing.
fn parse_filter_value<T: DeserializeOwned>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, Response> {
    match value {
        None => Ok(None),
        Some(raw) => serde_json::from_value(Value::String(raw.to_string()))
            .map(Some)
            .map_err(|_| {
                json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("unknown {field}: {raw}"),
                )
            }),
    }
}

fn log_json(entry: &ActivityLog) -> Value {
    json!({
        "id": entry.id,
        "user": {
            "id": entry.actor.user_id,
            "name": entry.actor.name,
            "email": entry.actor.email,
            "role": entry.actor.role,
        },
        "action": entry.action,
        "actionType": entry.action_type,
        "target": entry.target,
        "description": entry.description,
        "metadata": entry.metadata,
        "status": entry.status,
        "errorMessage": entry.error_message,
        "ipAddress": entry.request.ip_address,
        "userAgent": entry.request.user_agent,
        "createdAt": entry.created_at,
    })
}
