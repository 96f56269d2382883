/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// Redis connection URL.
    pub redis_url: String,
    /// HMAC secret for signing access and confirmation tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing refresh tokens. Kept separate from the access
    /// secret so compromise of one cannot forge the other kind.
    pub refresh_token_secret: String,
    /// User directory base URL (e.g. "http://users:3110"). Env var: `USERS_BASE_URL`.
    pub users_base_url: String,
    /// Notification service base URL (e.g. "http://notifier:3120"). Env var: `NOTIFIER_BASE_URL`.
    pub notifier_base_url: String,
    /// TCP port to listen on (default 3101). Env var: `AUTH_PORT`.
    pub auth_port: u16,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            access_token_secret: std::env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET"),
            refresh_token_secret: std::env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET"),
            users_base_url: std::env::var("USERS_BASE_URL").expect("USERS_BASE_URL"),
            notifier_base_url: std::env::var("NOTIFIER_BASE_URL").expect("NOTIFIER_BASE_URL"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3101),
        }
    }
}
