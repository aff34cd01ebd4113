//! Listing analysis endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::json;

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, TargetModel, log_activity};
use craftlens_core::AnalysisId;
use craftlens_infra::repos::ConsumeQuotaError;
use craftlens_listings::{
    Analysis, AnalysisStatus, ListingInput, generate_recommendations, mock_competitors,
    random_score,
};

use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};

/// POST /v1/analyze
///
/// Validation runs before the quota is touched; a rejected listing must not
/// consume an analysis.
pub async fn analyze(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Json(listing): Json<ListingInput>,
) -> Response {
    if let Err(err) = listing.validate() {
        return domain_error_to_response(err);
    }

    let now = Utc::now();
    let updated = match services.users.try_consume_analysis(user.0.id, now) {
        Ok(updated) => updated,
        Err(ConsumeQuotaError::QuotaExceeded { used, limit }) => {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "success": false,
                    "message": format!(
                        "Analysis limit reached. You've used {used}/{limit} analyses. Please upgrade your plan."
                    ),
                    "upgradeRequired": true,
                })),
            )
                .into_response();
        }
        Err(ConsumeQuotaError::NotFound) => {
            return json_error(StatusCode::NOT_FOUND, "not_found", "User not found");
        }
    };

    let started = Instant::now();
    let recommendations = generate_recommendations(&listing);
    let competitors = mock_competitors(listing.price);
    let score = random_score();
    let processing_time_ms = started.elapsed().as_millis() as u64;

    let analysis = Analysis {
        id: AnalysisId::new(),
        user_id: user.0.id,
        listing: listing.clone(),
        recommendations,
        competitors,
        score,
        status: AnalysisStatus::Completed,
        processing_time_ms,
        created_at: now,
    };
    services.analyses.insert(analysis.clone());

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::AnalysisPerformed,
            ActivityActionType::Create,
            format!("Analyzed listing \"{}\"", listing.title),
        )
        .target(
            TargetModel::Analysis,
            Some(analysis.id.into()),
            Some(listing.title.clone()),
        )
        .metadata(json!({ "score": score, "category": listing.category }))
        .request(meta.request_context()),
        now,
    );

    Json(json!({
        "success": true,
        "message": "Analysis completed",
        "analysis": {
            "id": analysis.id,
            "score": analysis.score,
            "recommendations": analysis.recommendations,
            "competitors": analysis.competitors,
            "processingTime": analysis.processing_time_ms,
            "createdAt": analysis.created_at,
        },
        "usage": {
            "current": updated.analysis_count,
            "limit": updated.analysis_limit,
            "remaining": updated.analysis_limit.saturating_sub(updated.analysis_count),
        },
    }))
    .into_response()
}
