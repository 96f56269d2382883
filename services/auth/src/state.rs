use deadpool_redis::Pool as RedisPool;

use crate::infra::directory::HttpUserDirectory;
use crate::infra::kv::{RedisChallengeStore, RedisSessionStore};
use crate::infra::notifier::HttpNotifier;
use crate::usecase::token::CredentialIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub redis: RedisPool,
    pub http: reqwest::Client,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub users_base_url: String,
    pub notifier_base_url: String,
}

impl AppState {
    pub fn issuer(&self) -> CredentialIssuer {
        CredentialIssuer {
            access_secret: self.access_token_secret.clone(),
            refresh_secret: self.refresh_token_secret.clone(),
        }
    }

    pub fn session_store(&self) -> RedisSessionStore {
        RedisSessionStore {
            pool: self.redis.clone(),
        }
    }

    pub fn challenge_store(&self) -> RedisChallengeStore {
        RedisChallengeStore {
            pool: self.redis.clone(),
        }
    }

    pub fn user_directory(&self) -> HttpUserDirectory {
        HttpUserDirectory {
            client: self.http.clone(),
            base_url: self.users_base_url.clone(),
        }
    }

    pub fn notifier(&self) -> HttpNotifier {
        HttpNotifier {
            client: self.http.clone(),
            base_url: self.notifier_base_url.clone(),
        }
    }
}
