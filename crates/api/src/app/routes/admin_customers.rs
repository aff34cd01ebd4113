//! Back-office customer (seller) management.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use craftlens_audit::{ActivityAction, ActivityActionType, NewActivity, TargetModel, log_activity};
use craftlens_auth::Permission;
use craftlens_core::UserId;
use craftlens_identity::{AccountStatus, AccountType, Plan, SubscriptionStatus, User};
use craftlens_infra::repos::UserFilter;
use craftlens_listings::Analysis;
use craftlens_notifications::{NewNotification, NotificationKind, create_notification};

use crate::app::dto::{admin_customer_json, pagination_json};
use crate::app::errors::{domain_error_to_response, json_error};
use crate::app::services::AppServices;
use crate::context::{AuthedUser, RequestMeta};
use crate::rbac::check_permission;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<AccountStatus>,
    pub plan: Option<Plan>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanBody {
    pub plan: Option<Plan>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysesQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// GET /v1/admin/customers
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
        &[Permission::from_static("customers.view")],
        false,
    )?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(20).clamp(1, 100);
    let filter = UserFilter {
        status: query.status,
        plan: query.plan,
        search: query.search,
        ..UserFilter::customers()
    };
    let (customers, total) = services.users.list(&filter, page, per_page);

    Ok(Json(json!({
        "success": true,
        "customers": customers.iter().map(admin_customer_json).collect::<Vec<_>>(),
        "stats": customer_stats(&services),
        "pagination": pagination_json(page, per_page, total),
    }))
    .into_response())
}

/// GET /v1/admin/customers/:id
pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("customers.view")],
        false,
    )?;

    let customer = load_customer(&services, id)?;
    let recent = services.analyses.list_for(id, 1, 5);
    Ok(Json(json!({
        "success": true,
        "customer": admin_customer_json(&customer),
        "analysisStats": {
            "total": recent.total,
            "recent": recent.items.iter().map(analysis_row).collect::<Vec<_>>(),
        },
    }))
    .into_response())
}

/// PUT /v1/admin/customers/:id/plan
pub async fn change_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
    Json(body): Json<PlanBody>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("customers.plans")],
        false,
    )?;

    let Some(plan) = body.plan else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "plan is required",
        ));
    };

    let mut customer = load_customer(&services, id)?;
    let old_plan = customer.plan;
    let now = Utc::now();
    customer.change_plan(plan, now);
    services
        .users
        .update(customer.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::SellerPlanChanged,
            ActivityActionType::Update,
            format!(
                "Changed plan for {} from {} to {}",
                customer.email,
                old_plan.as_str(),
                plan.as_str()
            ),
        )
        .target(
            TargetModel::User,
            Some(customer.id.into()),
            Some(customer.name.clone()),
        )
        .metadata(json!({ "oldPlan": old_plan, "newPlan": plan }))
        .request(meta.request_context()),
        now,
    );

    let kind = if plan.analysis_limit() >= old_plan.analysis_limit() {
        NotificationKind::PlanUpgraded
    } else {
        NotificationKind::PlanDowngraded
    };
    create_notification(
        &services.notifications,
        NewNotification::new(
            customer.id,
            kind,
            "Your plan has changed",
            format!("Your plan has been changed to {}.", plan.as_str()),
        ),
        now,
    );

    Ok(Json(json!({ "success": true, "customer": admin_customer_json(&customer) })).into_response())
}

/// POST /v1/admin/customers/:id/reset-usage
pub async fn reset_usage(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("customers.edit")],
        false,
    )?;

    load_customer(&services, id)?;
    let now = Utc::now();
    let customer = services
        .users
        .reset_usage(id, now)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "not_found", "Customer not found"))?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::SellerUpdated,
            ActivityActionType::Update,
            format!("Reset analysis usage for {}", customer.email),
        )
        .target(
            TargetModel::User,
            Some(customer.id.into()),
            Some(customer.name.clone()),
        )
        .request(meta.request_context()),
        now,
    );

    Ok(Json(json!({ "success": true, "customer": admin_customer_json(&customer) })).into_response())
}

/// POST /v1/admin/customers/:id/verify-email
pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("customers.verify")],
        false,
    )?;

    let mut customer = load_customer(&services, id)?;
    let now = Utc::now();
    customer.verify_email(now);
    services
        .users
        .update(customer.clone())
        .map_err(domain_error_to_response)?;

    log_activity(
        &services.activity_logs,
        NewActivity::new(
            user.actor(),
            ActivityAction::SellerVerified,
            ActivityActionType::Update,
            format!("Manually verified email for {}", customer.email),
        )
        .target(
            TargetModel::User,
            Some(customer.id.into()),
            Some(customer.name.clone()),
        )
        .request(meta.request_context()),
        now,
    );

    Ok(Json(json!({ "success": true, "customer": admin_customer_json(&customer) })).into_response())
}

/// GET /v1/admin/customers/:id/analyses
pub async fn analyses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<UserId>,
    Query(query): Query<AnalysesQuery>,
) -> Result<Response, Response> {
    check_permission(
        &services,
        &user,
        &meta,
        &[Permission::from_static("customers.view")],
        false,
    )?;

    load_customer(&services, id)?;
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.limit.unwrap_or(20).clamp(1, 100);
    let result = services.analyses.list_for(id, page, per_page);

    Ok(Json(json!({
        "success": true,
        "analyses": result.items.iter().map(analysis_row).collect::<Vec<_>>(),
        "pagination": pagination_json(page, per_page, result.total),
    }))
    .into_response())
}

fn analysis_row(analysis: &Analysis) -> Value {
    json!({
        "id": analysis.id,
        "title": analysis.listing.title,
        "category": analysis.listing.category,
        "score": analysis.score,
        "status": analysis.status,
        "createdAt": analysis.created_at,
    })
}

/// Aggregate block shown above the customer list.
fn customer_stats(services: &AppServices) -> Value {
    let users = &services.users;
    let with_status = |status| UserFilter {
        status: Some(status),
        ..UserFilter::customers()
    };
    let with_plan = |plan| UserFilter {
        plan: Some(plan),
        ..UserFilter::customers()
    };
    json!({
        "totalSellers": users.count(&UserFilter::customers()),
        "activeSellers": users.count(&with_status(AccountStatus::Active)),
        "pendingVerification": users.count(&with_status(AccountStatus::PendingVerification)),
        "suspendedSellers": users.count(&with_status(AccountStatus::Suspended)),
        "freePlan": users.count(&with_plan(Plan::Free)),
        "starterPlan": users.count(&with_plan(Plan::Starter)),
        "proPlan": users.count(&with_plan(Plan::Pro)),
        "unlimitedPlan": users.count(&with_plan(Plan::Unlimited)),
        "activeSubscriptions": users.count(&UserFilter {
            subscription_status: Some(SubscriptionStatus::Active),
            ..UserFilter::customers()
        }),
    })
}

fn load_customer(services: &AppServices, id: UserId) -> Result<User, Response> {
    services
        .users
        .get(id)
        .filter(|u| u.account_type == AccountType::Customer)
        .ok_or_else(|| json_error(StatusCode::NOT_FOUND, "not_found", "Customer not found"))
}
