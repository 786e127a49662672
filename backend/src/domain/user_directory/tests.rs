//! Tests for the user directory service.

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{ErrorCode, TokenSecret, TokenSettings};
use crate::test_support::MutableClock;
use chrono::{TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

const TTL_SECS: u64 = 600;

fn cheap_manager() -> CredentialManager {
    CredentialManager::with_params(8, 1, 1).expect("cheap test parameters")
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("valid fixture instant");
    Arc::new(MutableClock::new(start))
}

fn token_service(clock: &Arc<MutableClock>) -> TokenService {
    let secret = TokenSecret::new(b"directory-test-secret-0123456789".to_vec()).expect("secret");
    let settings = TokenSettings::new(secret, Duration::from_secs(TTL_SECS)).expect("settings");
    TokenService::new(&settings, clock.clone())
}

fn make_service(
    repo: MockUserRepository,
    clock: &Arc<MutableClock>,
) -> UserDirectoryService<MockUserRepository> {
    UserDirectoryService::new(Arc::new(repo), cheap_manager(), token_service(clock))
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("valid credentials")
}

fn stored_account(username: &str, password: &str) -> UserAccount {
    let identity = UserIdentity::new(
        UserId::random(),
        Username::new(username).expect("valid username"),
    );
    let hash = cheap_manager().hash(password).expect("hashing succeeds");
    UserAccount::new(identity, hash)
}

#[rstest]
#[tokio::test]
async fn register_stores_hashed_account(clock: Arc<MutableClock>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|account: &UserAccount| {
            account.identity().username().as_ref() == "alice"
                && account.password_hash().as_str() != "pw1"
                && cheap_manager().verify("pw1", account.password_hash())
        })
        .times(1)
        .return_once(|_| Ok(()));

    let identity = make_service(repo, &clock)
        .register(&credentials("alice", "pw1"))
        .await
        .expect("registration succeeds");
    assert_eq!(identity.username().as_ref(), "alice");
}

#[rstest]
#[tokio::test]
async fn register_rejects_existing_username(clock: Arc<MutableClock>) {
    let existing = stored_account("alice", "pw1");
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_insert().never();

    let error = make_service(repo, &clock)
        .register(&credentials("alice", "other"))
        .await
        .expect_err("duplicate must fail");
    assert_eq!(error.code(), ErrorCode::DuplicateUser);
}

#[rstest]
#[tokio::test]
async fn register_surfaces_store_uniqueness_race_as_duplicate(clock: Arc<MutableClock>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_username("alice")));

    let error = make_service(repo, &clock)
        .register(&credentials("alice", "pw1"))
        .await
        .expect_err("race loser must fail");
    assert_eq!(error.code(), ErrorCode::DuplicateUser);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn store_failures_are_mapped(
    clock: Arc<MutableClock>,
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(move |_| Err(failure));

    let error = make_service(repo, &clock)
        .register(&credentials("alice", "pw1"))
        .await
        .expect_err("store failure must surface");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn authenticate_issues_token_for_correct_password(clock: Arc<MutableClock>) {
    let account = stored_account("alice", "pw1");
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(move |_| Ok(Some(account)));

    let service = make_service(repo, &clock);
    let token = service
        .authenticate(&credentials("alice", "pw1"))
        .await
        .expect("login succeeds");

    assert_eq!(token.subject().as_ref(), "alice");
    assert_eq!(token.issued_at(), clock.utc());
    assert_eq!(
        token_service(&clock).validate(token.as_str()),
        Ok(token.subject().clone())
    );
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_wrong_password(clock: Arc<MutableClock>) {
    let account = stored_account("alice", "pw1");
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(move |_| Ok(Some(account)));

    let error = make_service(repo, &clock)
        .authenticate(&credentials("alice", "wrong"))
        .await
        .expect_err("wrong password must fail");
    assert_eq!(error.code(), ErrorCode::InvalidCredentials);
    assert!(!error.message().contains("wrong"));
}

#[rstest]
#[tokio::test]
async fn authenticate_reports_unknown_user(clock: Arc<MutableClock>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));

    let error = make_service(repo, &clock)
        .authenticate(&credentials("ghost", "pw1"))
        .await
        .expect_err("unknown user must fail");
    assert_eq!(error.code(), ErrorCode::UserNotFound);
}

#[rstest]
#[tokio::test]
async fn resolve_returns_identity_without_hash(clock: Arc<MutableClock>) {
    let account = stored_account("alice", "pw1");
    let expected = account.identity().clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(move |_| Ok(Some(account)));

    let identity = make_service(repo, &clock)
        .resolve(&Username::new("alice").expect("valid username"))
        .await
        .expect("resolve succeeds");
    assert_eq!(identity, expected);
}

#[rstest]
#[tokio::test]
async fn resolve_bearer_validates_then_looks_up(clock: Arc<MutableClock>) {
    let account = stored_account("alice", "pw1");
    let expected = account.identity().clone();
    let token = token_service(&clock)
        .issue(expected.username())
        .expect("issue token");
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .withf(|username: &Username| username.as_ref() == "alice")
        .times(1)
        .return_once(move |_| Ok(Some(account)));

    let identity = make_service(repo, &clock)
        .resolve_bearer(token.as_str())
        .await
        .expect("bearer resolves");
    assert_eq!(identity, expected);
}

#[rstest]
#[tokio::test]
async fn resolve_bearer_rejects_expired_tokens_before_lookup(clock: Arc<MutableClock>) {
    let alice = Username::new("alice").expect("valid username");
    let token = token_service(&clock).issue(&alice).expect("issue token");
    clock.advance_seconds(i64::try_from(TTL_SECS).expect("ttl fits"));
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().never();

    let error = make_service(repo, &clock)
        .resolve_bearer(token.as_str())
        .await
        .expect_err("expired token must fail");
    assert_eq!(error.code(), ErrorCode::InvalidToken);
}

#[rstest]
#[tokio::test]
async fn resolve_bearer_reports_deleted_subject(clock: Arc<MutableClock>) {
    let alice = Username::new("alice").expect("valid username");
    let token = token_service(&clock).issue(&alice).expect("issue token");
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));

    let error = make_service(repo, &clock)
        .resolve_bearer(token.as_str())
        .await
        .expect_err("missing subject must fail");
    assert_eq!(error.code(), ErrorCode::UserNotFound);
}
