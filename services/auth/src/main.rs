use tracing::info;

use vitrine_auth::config::AuthConfig;
use vitrine_auth::router::build_router;
use vitrine_auth::state::AppState;

#[tokio::main]
async fn main() {
    vitrine_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        redis,
        http,
        access_token_secret: config.access_token_secret,
        refresh_token_secret: config.refresh_token_secret,
        users_base_url: config.users_base_url,
        notifier_base_url: config.notifier_base_url,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
