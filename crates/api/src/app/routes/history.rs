//! Customer analysis history.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, TargetModel, log_activity};
use craftlens_core::AnalysisId;

use crate::app::dto::pagination_json;
use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// GET /v1/history
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(20).clamp(1, 100);
    let result = services.analyses.list_for(user.0.id, page, per_page);

    let analyses: Vec<_> = result
        .items
        .iter()
        .map(|analysis| {
            json!({
                "id": analysis.id,
                "title": analysis.listing.title,
                "category": analysis.listing.category,
                "score": analysis.score,
                "status": analysis.status,
                "createdAt": analysis.created_at,
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "analyses": analyses,
        "pagination": pagination_json(page, per_page, result.total),
    }))
    .into_response()
}

/// GET /v1/history/:id
pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<AnalysisId>,
) -> Response {
    let Some(analysis) = services.analyses.get_for(id, user.0.id) else {
        return json_error(StatusCode::NOT_FOUND, "not_found", "Analysis not found");
    };

    Json(json!({
        "success": true,
        "analysis": {
            "id": analysis.id,
            "listing": analysis.listing,
            "recommendations": analysis.recommendations,
            "competitors": analysis.competitors,
            "score": analysis.score,
            "status": analysis.status,
            "processingTime": analysis.processing_time_ms,
            "createdAt": analysis.created_at,
        },
    }))
    .into_response()
}

/// DELETE /v1/history/:id
pub async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<AnalysisId>,
) -> Response {
    let Some(analysis) = services.analyses.delete_for(id, user.0.id) else {
        return json_error(StatusCode::NOT_FOUND, "not_found", "Analysis not found");
    };

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::AnalysisDeleted,
            ActivityActionType::Delete,
            format!("Deleted analysis \"{}\"", analysis.listing.title),
        )
        .target(
            TargetModel::Analysis,
            Some(analysis.id.into()),
            Some(analysis.listing.title.clone()),
        )
        .request(meta.request_context()),
        Utc::now(),
    );

    Json(json!({ "success": true, "message": "Analysis deleted" })).into_response()
}

/// DELETE /v1/history
pub async fn delete_all(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
) -> Response {
    let deleted = services.analyses.delete_all_for(user.0.id);

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::AnalysisDeleted,
            ActivityActionType::Delete,
            format!("Cleared analysis history ({deleted} entries)"),
        )
        .metadata(json!({ "deletedCount": deleted }))
        .request(meta.request_context()),
        Utc::now(),
    );

    Json(json!({ "success": true, "deletedCount": deleted })).into_response()
}
