use vitrine_auth::domain::types::ACCESS_TOKEN_TTL_SECS;
use vitrine_auth::error::AuthServiceError;
use vitrine_auth::usecase::token::{CreateSessionInput, CreateSessionUseCase, RefreshSessionUseCase};
use vitrine_auth_types::token::validate_access_token;

use crate::helpers::{
    MockSessionStore, MockUserDirectory, TEST_ACCESS_SECRET, test_issuer, test_principal,
};

// ── CredentialIssuer ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_access_token_that_validates_successfully() {
    let principal = test_principal();
    let (token, exp) = test_issuer().issue_access(&principal).unwrap();

    assert!(!token.is_empty());
    assert!(exp > 0);

    let claims = validate_access_token(&token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(claims.sub, principal.id);
    assert_eq!(claims.role, principal.role);
    assert_eq!(claims.email, principal.email);
    assert_eq!(claims.exp, exp);
}

#[tokio::test]
async fn should_reject_access_token_presented_as_refresh() {
    let issuer = test_issuer();
    let (access, _) = issuer.issue_access(&test_principal()).unwrap();

    let result = issuer.verify_refresh(&access);
    assert!(
        matches!(result, Err(AuthServiceError::WrongTokenKind)),
        "expected WrongTokenKind, got {result:?}"
    );
}

#[tokio::test]
async fn should_issue_refresh_token_that_verifies_successfully() {
    let issuer = test_issuer();
    let token = issuer.issue_refresh("u1", "device-a").unwrap();

    let claims = issuer.verify_refresh(&token).unwrap();
    assert_eq!(claims.sub, "u1");
    assert_eq!(claims.device_id, "device-a");
}

// ── CreateSessionUseCase ─────────────────────────────────────────────────────

async fn create_session(
    principal_id: &str,
    store: MockSessionStore,
) -> Result<vitrine_auth::usecase::token::CreateSessionOutput, AuthServiceError> {
    let usecase = CreateSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: store,
        issuer: test_issuer(),
    };
    usecase
        .execute(CreateSessionInput {
            principal_id: principal_id.to_owned(),
            descriptor: "Chrome/Win".to_owned(),
            origin: "1.2.3.4".to_owned(),
        })
        .await
}

#[tokio::test]
async fn should_create_session_with_token_pair_for_known_principal() {
    let principal = test_principal();
    let store = MockSessionStore::new();
    let state = store.state_handle();

    let output = create_session(&principal.id, store).await.unwrap();

    assert!(!output.access_token.is_empty());
    assert!(!output.refresh_token.is_empty());
    assert_eq!(output.expires_in, ACCESS_TOKEN_TTL_SECS);

    let claims = validate_access_token(&output.access_token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(claims.sub, principal.id);

    // The registry holds the device under the principal's index, with the
    // exact refresh token string mirrored against it.
    let state = state.lock().unwrap();
    assert_eq!(state.index[&principal.id], vec![output.device_id.clone()]);
    let stored = &state.refresh[&(principal.id.clone(), output.device_id.clone())];
    assert_eq!(*stored, output.refresh_token);

    let session = &state.sessions[&(principal.id.clone(), output.device_id)];
    assert_eq!(session.descriptor, "Chrome/Win");
    assert_eq!(session.origin, "1.2.3.4");
    assert_eq!(session.created_at, session.last_activity_at);
}

#[tokio::test]
async fn should_return_not_found_when_principal_unknown_for_create_session() {
    let result = create_session("nobody", MockSessionStore::new()).await;

    assert!(
        matches!(result, Err(AuthServiceError::PrincipalNotFound)),
        "expected PrincipalNotFound, got {result:?}"
    );
}

// ── RefreshSessionUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_mint_new_access_token_for_registered_refresh_token() {
    let principal = test_principal();
    let store = MockSessionStore::new();
    let refresh = create_session(&principal.id, store.clone())
        .await
        .unwrap()
        .refresh_token;

    let usecase = RefreshSessionUseCase {
        users: MockUserDirectory::new(vec![principal.clone()]),
        sessions: store,
        issuer: test_issuer(),
    };

    let output = usecase.execute(&refresh).await.unwrap();

    assert!(!output.access_token.is_empty());
    assert_eq!(output.expires_in, ACCESS_TOKEN_TTL_SECS);

    let claims = validate_access_token(&output.access_token, TEST_ACCESS_SECRET).unwrap();
    assert_eq!(claims.sub, principal.id);
}

#[tokio::test]
async fn should_reject_refresh_token_superseded_in_registry() {
    let store = MockSessionStore::new();
    let refresh = create_session("u1", store.clone())
        .await
        .unwrap()
        .refresh_token;

    // A later login for the same device slot overwrote the mirror; the old
    // string no longer matches.
    for stored in store.state_handle().lock().unwrap().refresh.values_mut() {
        *stored = "superseded".to_owned();
    }

    let usecase = RefreshSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: store,
        issuer: test_issuer(),
    };

    let result = usecase.execute(&refresh).await;
    assert!(
        matches!(result, Err(AuthServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_when_device_unknown_to_registry() {
    let refresh = test_issuer().issue_refresh("u1", "ghost-device").unwrap();

    let usecase = RefreshSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: MockSessionStore::new(), // nothing registered
        issuer: test_issuer(),
    };

    let result = usecase.execute(&refresh).await;
    assert!(
        matches!(result, Err(AuthServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_unauthorized_when_refresh_jwt_invalid() {
    let usecase = RefreshSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: MockSessionStore::new(),
        issuer: test_issuer(),
    };

    let result = usecase.execute("not-a-valid-jwt").await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_unauthorized_when_refresh_signed_with_wrong_secret() {
    let foreign = vitrine_auth::usecase::token::CredentialIssuer {
        access_secret: TEST_ACCESS_SECRET.to_owned(),
        refresh_secret: "other-secret".to_owned(),
    };
    let refresh = foreign.issue_refresh("u1", "device-a").unwrap();

    let usecase = RefreshSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: MockSessionStore::new(),
        issuer: test_issuer(),
    };

    let result = usecase.execute(&refresh).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_unauthorized_when_principal_deleted_during_refresh() {
    let store = MockSessionStore::new();
    let refresh = create_session("u1", store.clone())
        .await
        .unwrap()
        .refresh_token;

    let usecase = RefreshSessionUseCase {
        users: MockUserDirectory::empty(), // principal no longer exists
        sessions: store,
        issuer: test_issuer(),
    };

    let result = usecase.execute(&refresh).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}
