//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

/// Header carrying the authenticated principal id.
pub const USER_ID_HEADER: &str = "x-vitrine-user-id";
/// Header carrying the authenticated principal's role.
pub const USER_ROLE_HEADER: &str = "x-vitrine-user-role";

/// Caller identity injected by the gateway via [`USER_ID_HEADER`] and
/// [`USER_ROLE_HEADER`] after it has validated the access token.
///
/// Ids are opaque directory ids, not parsed further here. Returns 401 if
/// either header is absent or empty; role enforcement (403) is done by
/// handlers after extraction.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user_id: String,
    pub user_role: String,
}

fn non_empty(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = non_empty(parts, USER_ID_HEADER);
        let user_role = non_empty(parts, USER_ROLE_HEADER);

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let user_role = user_role.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { user_id, user_role })
        }
    }
}
