use chrono::{Duration, Utc};

use vitrine_auth::error::AuthServiceError;
use vitrine_auth::usecase::revocation::RevocationCoordinator;
use vitrine_auth::usecase::session::ListSessionsUseCase;
use vitrine_auth::usecase::token::{
    CreateSessionInput, CreateSessionOutput, CreateSessionUseCase, RefreshSessionUseCase,
};

use crate::helpers::{MockChallengeStore, MockSessionStore, MockUserDirectory, test_issuer, test_principal};

async fn login(store: MockSessionStore, descriptor: &str, origin: &str) -> CreateSessionOutput {
    let usecase = CreateSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: store,
        issuer: test_issuer(),
    };
    usecase
        .execute(CreateSessionInput {
            principal_id: "u1".to_owned(),
            descriptor: descriptor.to_owned(),
            origin: origin.to_owned(),
        })
        .await
        .unwrap()
}

fn refresh_usecase(store: MockSessionStore) -> RefreshSessionUseCase<MockUserDirectory, MockSessionStore> {
    RefreshSessionUseCase {
        users: MockUserDirectory::new(vec![test_principal()]),
        sessions: store,
        issuer: test_issuer(),
    }
}

fn coordinator(
    store: MockSessionStore,
) -> RevocationCoordinator<MockSessionStore, MockChallengeStore, MockUserDirectory> {
    RevocationCoordinator {
        sessions: store,
        challenges: MockChallengeStore::new(),
        users: MockUserDirectory::new(vec![test_principal()]),
    }
}

// ── Concurrent device sessions ───────────────────────────────────────────────

#[tokio::test]
async fn should_keep_one_session_slot_per_login_event() {
    let store = MockSessionStore::new();

    let first = login(store.clone(), "Chrome/Win", "1.2.3.4").await;
    let second = login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    // Same browser, same address, still two independent slots.
    assert_ne!(first.device_id, second.device_id);

    let state = store.state_handle();
    let state = state.lock().unwrap();
    let index = &state.index["u1"];
    assert_eq!(index.len(), 2);
    assert!(index.contains(&first.device_id));
    assert!(index.contains(&second.device_id));
}

#[tokio::test]
async fn should_leave_other_devices_usable_after_single_device_logout() {
    let store = MockSessionStore::new();

    let phone = login(store.clone(), "Safari/iOS", "10.0.0.1").await;
    let laptop = login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    coordinator(store.clone())
        .on_logout("u1", &phone.device_id)
        .await
        .unwrap();

    let usecase = refresh_usecase(store);
    let result = usecase.execute(&phone.refresh_token).await;
    assert!(
        matches!(result, Err(AuthServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
    usecase.execute(&laptop.refresh_token).await.unwrap();
}

#[tokio::test]
async fn should_return_device_not_found_for_unknown_device_logout() {
    let store = MockSessionStore::new();
    login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    let result = coordinator(store).on_logout("u1", "no-such-device").await;

    assert!(
        matches!(result, Err(AuthServiceError::DeviceNotFound)),
        "expected DeviceNotFound, got {result:?}"
    );
}

// ── ListSessionsUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_sessions_most_recent_activity_first() {
    let store = MockSessionStore::new();

    let older = login(store.clone(), "Safari/iOS", "10.0.0.1").await;
    let newer = login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    // Stagger activity explicitly so ordering does not hinge on login timing.
    {
        let handle = store.state_handle();
        let mut state = handle.lock().unwrap();
        state
            .sessions
            .get_mut(&("u1".to_owned(), older.device_id.clone()))
            .unwrap()
            .last_activity_at = Utc::now() - Duration::minutes(30);
    }

    let listed = ListSessionsUseCase { sessions: store }
        .execute("u1")
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].device_id, newer.device_id);
    assert_eq!(listed[1].device_id, older.device_id);
}

#[tokio::test]
async fn should_return_empty_list_for_principal_without_sessions() {
    let listed = ListSessionsUseCase {
        sessions: MockSessionStore::new(),
    }
    .execute("u1")
    .await
    .unwrap();

    assert!(listed.is_empty());
}

#[tokio::test]
async fn should_prune_index_entries_whose_record_expired() {
    let store = MockSessionStore::new();
    let live = login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    // Simulate a session record that aged out from under its index entry.
    {
        let handle = store.state_handle();
        let mut state = handle.lock().unwrap();
        state.index.get_mut("u1").unwrap().push("stale-device".to_owned());
    }

    let listed = ListSessionsUseCase { sessions: store.clone() }
        .execute("u1")
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].device_id, live.device_id);

    let state = store.state_handle();
    let state = state.lock().unwrap();
    assert_eq!(state.index["u1"], vec![live.device_id]);
}

// ── Logout everywhere ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_revoke_every_device_on_logout_everywhere() {
    let store = MockSessionStore::new();

    let phone = login(store.clone(), "Safari/iOS", "10.0.0.1").await;
    let laptop = login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    coordinator(store.clone())
        .on_logout_everywhere("u1")
        .await
        .unwrap();

    let listed = ListSessionsUseCase { sessions: store.clone() }
        .execute("u1")
        .await
        .unwrap();
    assert!(listed.is_empty());

    let usecase = refresh_usecase(store);
    for refresh in [&phone.refresh_token, &laptop.refresh_token] {
        let result = usecase.execute(refresh).await;
        assert!(
            matches!(result, Err(AuthServiceError::SessionNotFound)),
            "expected SessionNotFound, got {result:?}"
        );
    }
}

// ── Full lifecycle ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_advance_activity_on_refresh_and_dead_end_after_logout() {
    let store = MockSessionStore::new();
    let session = login(store.clone(), "Chrome/Win", "1.2.3.4").await;

    let backdated = Utc::now() - Duration::minutes(10);
    {
        let handle = store.state_handle();
        let mut state = handle.lock().unwrap();
        state
            .sessions
            .get_mut(&("u1".to_owned(), session.device_id.clone()))
            .unwrap()
            .last_activity_at = backdated;
    }

    let usecase = refresh_usecase(store.clone());
    usecase.execute(&session.refresh_token).await.unwrap();

    {
        let handle = store.state_handle();
        let state = handle.lock().unwrap();
        let touched = &state.sessions[&("u1".to_owned(), session.device_id.clone())];
        assert!(
            touched.last_activity_at > backdated,
            "refresh should slide last_activity_at forward"
        );
    }

    coordinator(store)
        .on_logout("u1", &session.device_id)
        .await
        .unwrap();

    let result = usecase.execute(&session.refresh_token).await;
    assert!(
        matches!(result, Err(AuthServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
}
