//! Back-office analytics dashboards.

use std::sync::Arc;

use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use craftlens_auth::Permission;
use craftlens_identity::{AccountStatus, Plan, SubscriptionStatus};
use craftlens_infra::repos::{LogFilter, UserFilter};
use craftlens_listings::AnalysisStatus;

use craftlens_audit::ActivityStatus;

use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};
use crate::rbac::check_permission;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// GET /v1/admin/analytics/overview
pub async fn overview(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("analytics.view")],
        false,
    )?;

    let now = Utc::now();
    let month_ago = now - Duration::days(30);

    let customers = UserFilter::customers();
    let with_status = |status| UserFilter {
        status: Some(status),
        ..UserFilter::customers()
    };
    let with_plan = |plan| UserFilter {
        plan: Some(plan),
        ..UserFilter::customers()
    };

    let stats = services.activity_logs.stats();

    Ok(Json(json!({
        "success": true,
        "overview": {
            "customers": {
                "total": services.users.count(&customers),
                "active": services.users.count(&with_status(AccountStatus::Active)),
                "pendingVerification": services.users.count(&with_status(AccountStatus::PendingVerification)),
                "suspended": services.users.count(&with_status(AccountStatus::Suspended)),
                "newLast30Days": services.users.count_created_since(&customers, month_ago),
            },
            "admins": {
                "total": services.users.count(&UserFilter::admins()),
            },
            "plans": {
                "free": services.users.count(&with_plan(Plan::Free)),
                "starter": services.users.count(&with_plan(Plan::Starter)),
                "pro": services.users.count(&with_plan(Plan::Pro)),
                "unlimited": services.users.count(&with_plan(Plan::Unlimited)),
            },
            "subscriptions": {
                "active": services.users.count(&UserFilter {
                    subscription_status: Some(SubscriptionStatus::Active),
                    ..UserFilter::customers()
                }),
            },
            "analyses": {
                "total": services.analyses.count(),
                "completed": services.analyses.count_with_status(AnalysisStatus::Completed),
                "failed": services.analyses.count_with_status(AnalysisStatus::Failed),
                "last30Days": services.analyses.count_created_since(month_ago),
                "averageScore": services.analyses.average_score(),
            },
            "activity": {
                "totalLogs": stats.total,
                "failedLogs": stats.failed,
                "failedLast24h": services.activity_logs.count(&LogFilter {
                    status: Some(ActivityStatus::Failed),
                    from: Some(now - Duration::hours(24)),
                    ..Default::default()
                }),
            },
        },
    }))
    .into_response())
}

/// GET /v1/admin/analytics/recent-activities
pub async fn recent_activities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Query(query): Query<RecentQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("analytics.view")],
        false,
    )?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let result = services.activity_logs.list(&LogFilter::default(), 1, limit);
    let activities: Vec<_> = result
        .items
        .iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "userName": entry.actor.name,
                "userEmail": entry.actor.email,
                "action": entry.action,
                "description": entry.description,
                "status": entry.status,
                "createdAt": entry.created_at,
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "activities": activities })).into_response())
}
