use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod admin_analytics;
pub mod admin_customers;
pub mod admin_logs;
pub mod admin_roles;
pub mod admin_settings;
pub mod admin_users;
pub mod analyze;
pub mod auth_admin;
pub mod auth_customer;
pub mod history;
pub mod notifications;
pub mod system;

/// Unauthenticated endpoints.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/customer/signup", post(auth_customer::signup))
        .route("/auth/customer/login", post(auth_customer::login))
        .route(
            "/auth/customer/verify-email/:token",
            get(auth_customer::verify_email),
        )
        .route(
            "/auth/customer/resend-verification",
            post(auth_customer::resend_verification),
        )
        .route("/auth/admin/login", post(auth_admin::login))
}

/// Endpoints behind the customer gate.
pub fn customer_router() -> Router {
    Router::new()
        .route("/auth/customer/me", get(auth_customer::me))
        .route("/auth/customer/logout", post(auth_customer::logout))
        .route("/analyze", post(analyze::analyze))
        .route("/history", get(history::list).delete(history::delete_all))
        .route("/history/:id", get(history::get).delete(history::delete_one))
        .route("/notifications", get(notifications::list))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/:id/read", post(notifications::mark_read))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id", delete(notifications::delete))
}

/// Endpoints behind the admin gate.
pub fn admin_router() -> Router {
    let users = Router::new()
        .route("/", get(admin_users::list).post(admin_users::create))
        .route(
            "/:id",
            get(admin_users::get)
                .put(admin_users::update)
                .delete(admin_users::delete),
        )
        .route("/:id/suspend", post(admin_users::suspend))
        .route("/:id/activate", post(admin_users::activate));

    let customers = Router::new()
        .route("/", get(admin_customers::list))
        .route("/:id", get(admin_customers::get))
        .route("/:id/plan", put(admin_customers::change_plan))
        .route("/:id/reset-usage", post(admin_customers::reset_usage))
        .route("/:id/verify-email", post(admin_customers::verify_email))
        .route("/:id/analyses", get(admin_customers::analyses));

    let roles = Router::new()
        .route("/", get(admin_roles::list).post(admin_roles::create))
        .route("/permissions/available", get(admin_roles::available_permissions))
        .route(
            "/:id",
            get(admin_roles::get)
                .put(admin_roles::update)
                .delete(admin_roles::delete),
        );

    let logs = Router::new()
        .route("/", get(admin_logs::list))
        .route("/stats/summary", get(admin_logs::summary))
        .route("/user/:id", get(admin_logs::for_user))
        .route("/export/csv", get(admin_logs::export_csv))
        .route("/old", delete(admin_logs::purge))
        .route("/:id", get(admin_logs::get));

    let analytics = Router::new()
        .route("/overview", get(admin_analytics::overview))
        .route("/recent-activities", get(admin_analytics::recent_activities));

    let settings = Router::new()
        .route("/", get(admin_settings::get))
        .route("/general", put(admin_settings::update_general))
        .route("/email", put(admin_settings::update_email))
        .route("/customer", put(admin_settings::update_customer))
        .route("/security", put(admin_settings::update_security))
        .route("/notification", put(admin_settings::update_notification))
        .route("/maintenance", put(admin_settings::update_maintenance))
        .route("/features", put(admin_settings::update_features))
        .route(
            "/theme",
            get(admin_settings::get_theme).put(admin_settings::update_theme),
        );

    Router::new()
        .route("/auth/admin/me", get(auth_admin::me))
        .route("/auth/admin/logout", post(auth_admin::logout))
        .route(
            "/auth/admin/change-password",
            post(auth_admin::change_password),
        )
        .nest("/admin/users", users)
        .nest("/admin/customers", customers)
        .nest("/admin/roles", roles)
        .nest("/admin/logs", logs)
        .nest("/admin/analytics", analytics)
        .nest("/admin/settings", settings)
}
