//! End-to-end tests against a real listening server.

use std::sync::Arc;

use craftlens_api::app::{AppServices, build_app_with, build_services};
use serde_json::{Value, json};

struct TestServer {
    base: String,
    client: reqwest::Client,
    services: Arc<AppServices>,
}

impl TestServer {
    async fn spawn() -> Self {
        let services = Arc::new(build_services("test-secret"));
        services.seed_super_admin("Root", "root@example.com", "root-password");
        let app = build_app_with(Arc::clone(&services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            services,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post_authed(&self, path: &str, token: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn get_authed(&self, path: &str, token: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn delete_authed(&self, path: &str, token: &str) -> (u16, Value) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    /// Signup + email verification + login, returning the customer token.
    async fn onboard_customer(&self, email: &str) -> String {
        let (status, body) = self
            .post_json(
                "/v1/auth/customer/signup",
                json!({ "name": "Maya", "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, 201, "signup failed: {body}");

        let token = body["verificationToken"].as_str().unwrap().to_string();
        let resp = self
            .client
            .get(self.url(&format!("/v1/auth/customer/verify-email/{token}")))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());

        let (status, body) = self
            .post_json(
                "/v1/auth/customer/login",
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, 200, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_login(&self, email: &str, password: &str) -> (u16, Value) {
        self.post_json(
            "/v1/auth/admin/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let server = TestServer::spawn().await;
    let resp = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let server = TestServer::spawn().await;
    let resp = reqwest::get(server.url("/v1/auth/customer/me")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "No authentication token, access denied");
}

#[tokio::test]
async fn signup_verify_login_analyze_and_hit_the_quota() {
    let server = TestServer::spawn().await;

    // unverified accounts cannot log in
    let (status, body) = server
        .post_json(
            "/v1/auth/customer/signup",
            json!({ "name": "Ana", "email": "ana@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, 201, "{body}");
    let (status, body) = server
        .post_json(
            "/v1/auth/customer/login",
            json!({ "email": "ana@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["action"], "verify_email");

    let token = server.onboard_customer("maya@example.com").await;

    let listing = json!({
        "title": "Hand-thrown ceramic mug",
        "description": "Stoneware mug with a matte glaze",
        "price": 24.0,
        "category": "Home & Living",
    });
    let (status, body) = server.post_authed("/v1/analyze", &token, listing.clone()).await;
    assert_eq!(status, 200, "{body}");
    let score = body["analysis"]["score"].as_u64().unwrap();
    assert!((70..90).contains(&score));
    assert_eq!(body["usage"]["current"], 1);
    assert_eq!(body["usage"]["limit"], 1);
    assert_eq!(body["usage"]["remaining"], 0);

    // the free plan allows exactly one analysis
    let (status, body) = server.post_authed("/v1/analyze", &token, listing).await;
    assert_eq!(status, 403);
    assert_eq!(body["upgradeRequired"], true);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Analysis limit reached")
    );

    // the analysis landed in history
    let (status, body) = server.get_authed("/v1/history", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["totalItems"], 1);
}

#[tokio::test]
async fn invalid_listing_does_not_consume_quota() {
    let server = TestServer::spawn().await;
    let token = server.onboard_customer("maya@example.com").await;

    let (status, _) = server
        .post_authed(
            "/v1/analyze",
            &token,
            json!({ "title": "", "description": "x", "price": 10.0, "category": "Art" }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post_authed(
            "/v1/analyze",
            &token,
            json!({ "title": "Mug", "description": "x", "price": 10.0, "category": "Art" }),
        )
        .await;
    assert_eq!(status, 200, "{body}");
}

#[tokio::test]
async fn five_failed_admin_logins_lock_the_account() {
    let server = TestServer::spawn().await;

    for _ in 0..5 {
        let (status, _) = server.admin_login("root@example.com", "wrong-password").await;
        assert_eq!(status, 401);
    }

    // even the right password is rejected while locked
    let (status, body) = server.admin_login("root@example.com", "root-password").await;
    assert_eq!(status, 423);
    assert!(body["message"].as_str().unwrap().contains("locked"));
}

#[tokio::test]
async fn unknown_admin_email_gets_a_generic_401() {
    let server = TestServer::spawn().await;
    let (status, body) = server.admin_login("ghost@example.com", "whatever").await;
    assert_eq!(status, 401);
    assert_eq!(
        body["message"],
        "Invalid credentials or insufficient privileges"
    );
}

#[tokio::test]
async fn customers_cannot_reach_the_back_office() {
    let server = TestServer::spawn().await;
    let token = server.onboard_customer("maya@example.com").await;

    let (status, body) = server.get_authed("/v1/admin/users", &token).await;
    assert_eq!(status, 403);
    assert_eq!(body["message"], "Access denied. Admin privileges required.");
}

#[tokio::test]
async fn viewer_denial_is_audited_with_required_permissions() {
    let server = TestServer::spawn().await;
    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let root_token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["permissions"][0], "*");

    // provision a viewer through the API
    let (status, body) = server
        .post_authed(
            "/v1/admin/users",
            &root_token,
            json!({
                "name": "Vera",
                "email": "vera@example.com",
                "password": "password123",
                "role": "viewer",
            }),
        )
        .await;
    assert_eq!(status, 201, "{body}");
    let viewer_id = body["user"]["id"].as_str().unwrap().to_string();

    let (_, body) = server.admin_login("vera@example.com", "password123").await;
    let viewer_token = body["token"].as_str().unwrap().to_string();

    // viewers can read
    let (status, _) = server.get_authed("/v1/admin/users", &viewer_token).await;
    assert_eq!(status, 200);

    // but not delete
    let (status, body) = server
        .delete_authed(&format!("/v1/admin/users/{viewer_id}"), &viewer_token)
        .await;
    assert_eq!(status, 403);
    assert_eq!(
        body["message"],
        "You do not have permission to perform this action"
    );
    assert_eq!(body["requiredPermissions"][0], "users.delete");

    // the denial shows up in the audit trail
    let (status, body) = server
        .get_authed(
            "/v1/admin/logs?action=unauthorized_access",
            &root_token,
        )
        .await;
    assert_eq!(status, 200);
    let logs = body["logs"].as_array().unwrap();
    assert!(!logs.is_empty());
    assert_eq!(logs[0]["user"]["email"], "vera@example.com");
    assert_eq!(logs[0]["status"], "failed");
}

#[tokio::test]
async fn custom_role_lifecycle_and_assignment_guard() {
    let server = TestServer::spawn().await;
    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = server
        .post_authed(
            "/v1/admin/roles",
            &token,
            json!({
                "name": "Support Agent",
                "description": "Read-only support",
                "permissions": ["customers.view", "logs.view"],
            }),
        )
        .await;
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["role"]["name"], "support_agent");
    let role_id = body["role"]["id"].as_str().unwrap().to_string();

    // unknown permissions are rejected
    let (status, _) = server
        .post_authed(
            "/v1/admin/roles",
            &token,
            json!({ "name": "Bad", "permissions": ["logs.rewrite"] }),
        )
        .await;
    assert_eq!(status, 400);

    // assign the role to a new admin, then deletion is blocked
    let (status, body) = server
        .post_authed(
            "/v1/admin/users",
            &token,
            json!({
                "name": "Sam",
                "email": "sam@example.com",
                "password": "password123",
                "role": "custom",
                "customRoleId": role_id,
            }),
        )
        .await;
    assert_eq!(status, 201, "{body}");

    let (status, body) = server
        .delete_authed(&format!("/v1/admin/roles/{role_id}"), &token)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["usersWithRole"], 1);

    // the custom-role admin holds exactly the granted permissions
    let (_, body) = server.admin_login("sam@example.com", "password123").await;
    let perms = body["user"]["permissions"].as_array().unwrap();
    assert_eq!(perms.len(), 2);
    let sam_token = body["token"].as_str().unwrap().to_string();
    let (status, _) = server.get_authed("/v1/admin/customers", &sam_token).await;
    assert_eq!(status, 200);
    let (status, _) = server.get_authed("/v1/admin/settings", &sam_token).await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn deleting_a_referenced_role_fails_closed_for_its_users() {
    let server = TestServer::spawn().await;
    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (_, body) = server
        .post_authed(
            "/v1/admin/roles",
            &token,
            json!({ "name": "Temp", "permissions": ["logs.view"] }),
        )
        .await;
    let role_id = body["role"]["id"].as_str().unwrap().to_string();

    let (_, _) = server
        .post_authed(
            "/v1/admin/users",
            &token,
            json!({
                "name": "Tia",
                "email": "tia@example.com",
                "password": "password123",
                "role": "custom",
                "customRoleId": role_id,
            }),
        )
        .await;

    // bypass the API guard to simulate a dangling reference
    let role = server
        .services
        .roles
        .get(role_id.parse().unwrap())
        .unwrap();
    server.services.roles.delete(role.id);

    let (_, body) = server.admin_login("tia@example.com", "password123").await;
    let tia_token = body["token"].as_str().unwrap().to_string();
    let (status, body) = server.get_authed("/v1/admin/logs", &tia_token).await;
    assert_eq!(status, 403, "{body}");
}

#[tokio::test]
async fn plan_change_raises_the_quota_and_notifies_the_customer() {
    let server = TestServer::spawn().await;
    let customer_token = server.onboard_customer("maya@example.com").await;
    let (_, body) = server.get_authed("/v1/auth/customer/me", &customer_token).await;
    let customer_id = body["user"]["id"].as_str().unwrap().to_string();

    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let admin_token = body["token"].as_str().unwrap().to_string();

    let resp = server
        .client
        .put(server.url(&format!("/v1/admin/customers/{customer_id}/plan")))
        .bearer_auth(&admin_token)
        .json(&json!({ "plan": "starter" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["customer"]["analysisLimit"], 50);

    // welcome + plan-change notifications are both unread
    let (status, body) = server
        .get_authed("/v1/notifications/unread-count", &customer_token)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["unreadCount"], 2);

    let (_, body) = server.get_authed("/v1/notifications", &customer_token).await;
    let first = body["notifications"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = server
        .post_authed(&format!("/v1/notifications/{first}/read"), &customer_token, json!({}))
        .await;
    assert_eq!(status, 200);
    let (_, body) = server
        .get_authed("/v1/notifications/unread-count", &customer_token)
        .await;
    assert_eq!(body["unreadCount"], 1);
}

#[tokio::test]
async fn non_active_statuses_are_rejected_at_the_customer_gate() {
    let server = TestServer::spawn().await;
    let token = server.onboard_customer("maya@example.com").await;

    let mut user = server.services.users.get_by_email("maya@example.com").unwrap();
    user.status = craftlens_identity::AccountStatus::Inactive;
    server.services.users.update(user).unwrap();

    let (status, body) = server.get_authed("/v1/notifications", &token).await;
    assert_eq!(status, 403, "{body}");
    assert_eq!(
        body["message"],
        "Your account is not active. Please contact support."
    );
}

#[tokio::test]
async fn expired_tokens_get_their_own_401() {
    let server = TestServer::spawn().await;
    server.onboard_customer("maya@example.com").await;
    let user = server.services.users.get_by_email("maya@example.com").unwrap();

    let stale = server
        .services
        .tokens
        .issue(user.id, chrono::Utc::now() - chrono::Duration::days(8))
        .unwrap();
    let (status, body) = server.get_authed("/v1/auth/customer/me", &stale).await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Token expired");

    let (status, body) = server.get_authed("/v1/auth/customer/me", "not.a.jwt").await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn stale_verification_tokens_are_rejected() {
    let server = TestServer::spawn().await;
    let (_, body) = server
        .post_json(
            "/v1/auth/customer/signup",
            json!({ "name": "Noa", "email": "noa@example.com", "password": "password123" }),
        )
        .await;
    let token = body["verificationToken"].as_str().unwrap().to_string();

    // age the token past its 24h window
    let mut user = server.services.users.get_by_email("noa@example.com").unwrap();
    user.email_verification_expires = Some(chrono::Utc::now() - chrono::Duration::hours(1));
    server.services.users.update(user).unwrap();

    let resp = reqwest::get(server.url(&format!("/v1/auth/customer/verify-email/{token}")))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // resending issues a fresh token with a fresh window
    let (status, body) = server
        .post_json(
            "/v1/auth/customer/resend-verification",
            json!({ "email": "noa@example.com" }),
        )
        .await;
    assert_eq!(status, 200, "{body}");
    let fresh = body["verificationToken"].as_str().unwrap().to_string();
    let resp = reqwest::get(server.url(&format!("/v1/auth/customer/verify-email/{fresh}")))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn quota_comes_back_after_the_monthly_reset() {
    let server = TestServer::spawn().await;
    let token = server.onboard_customer("maya@example.com").await;

    let listing = json!({
        "title": "Hand-thrown ceramic mug",
        "description": "Stoneware mug with a matte glaze",
        "price": 24.0,
        "category": "Home & Living",
    });
    let (status, _) = server.post_authed("/v1/analyze", &token, listing.clone()).await;
    assert_eq!(status, 200);
    let (status, _) = server.post_authed("/v1/analyze", &token, listing.clone()).await;
    assert_eq!(status, 403);

    // move the reset date into the past, as a new month arriving would
    let mut user = server.services.users.get_by_email("maya@example.com").unwrap();
    user.monthly_reset_date = chrono::Utc::now() - chrono::Duration::days(1);
    server.services.users.update(user).unwrap();

    let (status, body) = server.post_authed("/v1/analyze", &token, listing).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["usage"]["current"], 1);
}

#[tokio::test]
async fn suspension_locks_the_customer_out_until_reactivated() {
    let server = TestServer::spawn().await;
    let customer_token = server.onboard_customer("maya@example.com").await;
    let (_, body) = server.get_authed("/v1/auth/customer/me", &customer_token).await;
    let customer_id = body["user"]["id"].as_str().unwrap().to_string();

    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let admin_token = body["token"].as_str().unwrap().to_string();
    let admin_id = body["user"]["id"].as_str().unwrap().to_string();

    // super admins cannot be suspended
    let (status, body) = server
        .post_authed(
            &format!("/v1/admin/users/{admin_id}/suspend"),
            &admin_token,
            json!({}),
        )
        .await;
    assert_eq!(status, 403, "{body}");
    assert_eq!(body["message"], "Cannot suspend super admin");

    let (status, body) = server
        .post_authed(
            &format!("/v1/admin/users/{customer_id}/suspend"),
            &admin_token,
            json!({ "reason": "Chargeback dispute" }),
        )
        .await;
    assert_eq!(status, 200, "{body}");

    // both fresh logins and the existing token are refused
    let (status, _) = server
        .post_json(
            "/v1/auth/customer/login",
            json!({ "email": "maya@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, 403);
    let (status, _) = server.get_authed("/v1/notifications", &customer_token).await;
    assert_eq!(status, 403);

    let (status, _) = server
        .post_authed(
            &format!("/v1/admin/users/{customer_id}/activate"),
            &admin_token,
            json!({}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = server
        .post_json(
            "/v1/auth/customer/login",
            json!({ "email": "maya@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, 200, "{body}");
    let token = body["token"].as_str().unwrap().to_string();

    // the suspension notification carries the reason
    let (_, body) = server.get_authed("/v1/notifications", &token).await;
    let kinds: Vec<&str> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"account_suspended"));
    assert!(kinds.contains(&"account_activated"));
    let suspended = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["kind"] == "account_suspended")
        .unwrap();
    assert_eq!(suspended["message"], "Chargeback dispute");
    assert_eq!(suspended["priority"], "urgent");
}

#[tokio::test]
async fn resend_verification_rotates_the_token() {
    let server = TestServer::spawn().await;
    let (status, body) = server
        .post_json(
            "/v1/auth/customer/signup",
            json!({ "name": "Noa", "email": "noa@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, 201, "{body}");
    let old_token = body["verificationToken"].as_str().unwrap().to_string();

    let (status, body) = server
        .post_json(
            "/v1/auth/customer/resend-verification",
            json!({ "email": "noa@example.com" }),
        )
        .await;
    assert_eq!(status, 200, "{body}");
    let new_token = body["verificationToken"].as_str().unwrap().to_string();
    assert_ne!(old_token, new_token);

    // the old token stops working, the new one verifies
    let resp = reqwest::get(server.url(&format!(
        "/v1/auth/customer/verify-email/{old_token}"
    )))
    .await
    .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let resp = reqwest::get(server.url(&format!(
        "/v1/auth/customer/verify-email/{new_token}"
    )))
    .await
    .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let (status, body) = server
        .post_json(
            "/v1/auth/customer/resend-verification",
            json!({ "email": "noa@example.com" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["action"], "login");

    let (status, body) = server
        .post_json(
            "/v1/auth/customer/resend-verification",
            json!({ "email": "ghost@example.com" }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["action"], "signup");
}

#[tokio::test]
async fn log_purge_floor_is_enforced() {
    let server = TestServer::spawn().await;
    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let token = body["token"].as_str().unwrap().to_string();

    let resp = server
        .client
        .delete(server.url("/v1/admin/logs/old"))
        .bearer_auth(&token)
        .json(&json!({ "days": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Cannot delete logs newer than 30 days")
    );

    // no body defaults to the 90-day cutoff
    let (status, body) = server.delete_authed("/v1/admin/logs/old", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["deletedCount"], 0);
}

#[tokio::test]
async fn csv_export_carries_the_attachment_headers() {
    let server = TestServer::spawn().await;
    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let token = body["token"].as_str().unwrap().to_string();

    let resp = server
        .client
        .get(server.url("/v1/admin/logs/export/csv"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/csv"
    );
    assert!(
        resp.headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=")
    );
    let csv = resp.text().await.unwrap();
    assert!(csv.starts_with(
        "Date,User Name,User Email,User Role,Action,Action Type,Description,Status,IP Address"
    ));
    // at least the root login row
    assert!(csv.contains("root@example.com"));
}

#[tokio::test]
async fn settings_sections_update_independently() {
    let server = TestServer::spawn().await;
    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = server.get_authed("/v1/admin/settings", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["settings"]["site_name"], "CraftLens");

    let resp = server
        .client
        .put(server.url("/v1/admin/settings/general"))
        .bearer_auth(&token)
        .json(&json!({ "siteName": "Acme Listings" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["settings"]["site_name"], "Acme Listings");
    // untouched fields keep their values
    assert_eq!(body["settings"]["support_email"], "support@example.com");

    let resp = server
        .client
        .put(server.url("/v1/admin/settings/maintenance"))
        .bearer_auth(&token)
        .json(&json!({ "enabled": true, "message": "Back soon" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["settings"]["maintenance"]["enabled"], true);
}

#[tokio::test]
async fn analytics_overview_reflects_activity() {
    let server = TestServer::spawn().await;
    let customer_token = server.onboard_customer("maya@example.com").await;
    let (_, _) = server
        .post_authed(
            "/v1/analyze",
            &customer_token,
            json!({ "title": "Mug", "description": "x", "price": 10.0, "category": "Art" }),
        )
        .await;

    let (_, body) = server.admin_login("root@example.com", "root-password").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = server.get_authed("/v1/admin/analytics/overview", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["overview"]["customers"]["total"], 1);
    assert_eq!(body["overview"]["analyses"]["total"], 1);
    let avg = body["overview"]["analyses"]["averageScore"].as_f64().unwrap();
    assert!((70.0..90.0).contains(&avg));

    let (status, body) = server
        .get_authed("/v1/admin/analytics/recent-activities", &token)
        .await;
    assert_eq!(status, 200);
    assert!(!body["activities"].as_array().unwrap().is_empty());
}
