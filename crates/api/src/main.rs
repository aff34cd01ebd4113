use std::sync::Arc;

#[tokio::main]
async fn main() {
    craftlens_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let services = Arc::new(craftlens_api::app::build_services(&jwt_secret));

    // First-run bootstrap: without one super admin nobody can log in to the
    // back office.
    if let (Ok(email), Ok(password)) = (
        std::env::var("SEED_ADMIN_EMAIL"),
        std::env::var("SEED_ADMIN_PASSWORD"),
    ) {
        let name = std::env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string());
        services.seed_super_admin(&name, &email, &password);
    }

    let app = craftlens_api::app::build_app_with(services);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
