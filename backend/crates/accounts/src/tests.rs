//! Unit and router-level tests for the accounts crate
//!
//! Store and mailer traits are backed by in-memory mocks; router tests
//! drive the real middleware stack through `tower::ServiceExt::oneshot`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use kernel::id::{AccountId, ChildId, ParentId};

use crate::domain::entity::{Account, Child, NewAccount, Parent};
use crate::domain::repository::{AccountStore, Mailer, SessionStore};
use crate::domain::value_object::{Email, Role};
use crate::error::{AccountError, AccountResult};

// ============================================================================
// In-memory mocks
// ============================================================================

#[derive(Clone, Default)]
struct InMemorySessionStore {
    inner: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl InMemorySessionStore {
    fn new() -> Self {
        Self::default()
    }

    /// Force a session into the expired state
    fn expire_now(&self, session_id: &str) {
        let mut map = self.inner.lock().unwrap();
        if let Some(entry) = map.get_mut(session_id) {
            entry.1 = Instant::now() - Duration::from_secs(1);
        }
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create(&self, account_key: &str, ttl: Duration) -> AccountResult<String> {
        let session_id = platform::crypt::random_token(32);
        self.inner.lock().unwrap().insert(
            session_id.clone(),
            (account_key.to_string(), Instant::now() + ttl),
        );
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> AccountResult<String> {
        let mut map = self.inner.lock().unwrap();
        match map.get(session_id) {
            Some((key, expires_at)) if *expires_at > Instant::now() => Ok(key.clone()),
            Some(_) => {
                map.remove(session_id);
                Err(AccountError::SessionNotFound)
            }
            None => Err(AccountError::SessionNotFound),
        }
    }

    async fn renew(&self, session_id: &str, ttl: Duration) -> AccountResult<()> {
        let mut map = self.inner.lock().unwrap();
        match map.get_mut(session_id) {
            Some(entry) if entry.1 > Instant::now() => {
                entry.1 = Instant::now() + ttl;
                Ok(())
            }
            Some(_) => {
                map.remove(session_id);
                Err(AccountError::SessionNotFound)
            }
            None => Err(AccountError::SessionNotFound),
        }
    }

    async fn delete(&self, session_id: &str) -> AccountResult<()> {
        self.inner.lock().unwrap().remove(session_id);
        Ok(())
    }
}

#[derive(Default)]
struct AccountsInner {
    next_account_id: i64,
    next_parent_id: i64,
    next_child_id: i64,
    accounts: Vec<Account>,
    parents: Vec<Parent>,
    children: Vec<Child>,
    /// (parent profile id, child profile id)
    links: Vec<(i64, i64)>,
}

#[derive(Clone, Default)]
struct InMemoryAccountStore {
    inner: Arc<Mutex<AccountsInner>>,
}

impl InMemoryAccountStore {
    fn new() -> Self {
        Self::default()
    }

    fn seed_account(&self, role: Role, email: &str, password: &str, verified: bool) -> Account {
        let mut inner = self.inner.lock().unwrap();
        inner.next_account_id += 1;
        let account = Account {
            id: AccountId::from(inner.next_account_id),
            role,
            first_name: "Test".to_string(),
            second_name: "T".to_string(),
            last_name: "User".to_string(),
            phone: "+70000000000".to_string(),
            email: Email::from_db(email),
            email_verified: verified,
            password_hash: platform::password::hash_password(password).unwrap(),
        };
        inner.accounts.push(account.clone());
        account
    }

    fn seed_parent_profile(&self, account_id: AccountId) -> Parent {
        let mut inner = self.inner.lock().unwrap();
        inner.next_parent_id += 1;
        let id = inner.next_parent_id;
        let account = inner
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .unwrap();
        let parent = Parent {
            id: ParentId::from(id),
            account_id,
            passport: None,
            passport_verified: false,
            first_name: account.first_name,
            second_name: account.second_name,
            last_name: account.last_name,
            phone: account.phone,
            email: account.email.into_db(),
            email_verified: account.email_verified,
        };
        inner.parents.push(parent.clone());
        parent
    }

    fn seed_child_profile(&self, account_id: AccountId, parent_id: Option<ParentId>) -> Child {
        let mut inner = self.inner.lock().unwrap();
        inner.next_child_id += 1;
        let id = inner.next_child_id;
        let account = inner
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .unwrap();
        let child = Child {
            id: ChildId::from(id),
            account_id,
            birth_date: None,
            first_name: account.first_name,
            second_name: account.second_name,
            last_name: account.last_name,
            phone: account.phone,
            email: account.email.into_db(),
            email_verified: account.email_verified,
        };
        inner.children.push(child.clone());
        if let Some(parent_id) = parent_id {
            inner.links.push((parent_id.into(), id));
        }
        child
    }

    fn remove_account(&self, account_id: AccountId) {
        self.inner
            .lock()
            .unwrap()
            .accounts
            .retain(|a| a.id != account_id);
    }
}

impl AccountStore for InMemoryAccountStore {
    async fn get_by_email(&self, email: &Email) -> AccountResult<Option<Account>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn get_by_id(&self, id: AccountId) -> AccountResult<Option<Account>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, account: &NewAccount) -> AccountResult<Account> {
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.iter().any(|a| a.email == account.email) {
            return Err(AccountError::EmailTaken);
        }
        inner.next_account_id += 1;
        let created = Account {
            id: AccountId::from(inner.next_account_id),
            role: account.role,
            first_name: account.first_name.clone(),
            second_name: account.second_name.clone(),
            last_name: account.last_name.clone(),
            phone: account.phone.clone(),
            email: account.email.clone(),
            email_verified: account.email_verified,
            password_hash: account.password_hash.clone(),
        };
        inner.accounts.push(created.clone());
        Ok(created)
    }

    async fn mark_email_verified(&self, email: &Email) -> AccountResult<AccountId> {
        let mut inner = self.inner.lock().unwrap();
        match inner.accounts.iter_mut().find(|a| a.email == *email) {
            Some(account) => {
                account.email_verified = true;
                Ok(account.id)
            }
            None => Err(AccountError::AccountNotFound),
        }
    }

    async fn parent_profile(&self, account_id: AccountId) -> AccountResult<Option<Parent>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .parents
            .iter()
            .find(|p| p.account_id == account_id)
            .cloned())
    }

    async fn child_profile(&self, account_id: AccountId) -> AccountResult<Option<Child>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .children
            .iter()
            .find(|c| c.account_id == account_id)
            .cloned())
    }

    async fn create_parent_profile(&self, account_id: AccountId) -> AccountResult<Parent> {
        if let Some(existing) = self.parent_profile(account_id).await? {
            return Ok(existing);
        }
        Ok(self.seed_parent_profile(account_id))
    }

    async fn children_of(&self, parent_id: ParentId) -> AccountResult<Vec<Child>> {
        let inner = self.inner.lock().unwrap();
        let child_ids: Vec<i64> = inner
            .links
            .iter()
            .filter(|(p, _)| *p == i64::from(parent_id))
            .map(|(_, c)| *c)
            .collect();
        Ok(inner
            .children
            .iter()
            .filter(|c| child_ids.contains(&i64::from(c.id)))
            .cloned()
            .collect())
    }

    async fn managers(&self) -> AccountResult<Vec<Account>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .iter()
            .filter(|a| a.role == Role::Manager)
            .cloned()
            .collect())
    }
}

/// Mailer that records instead of sending
#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingMailer {
    fn new() -> Self {
        Self::default()
    }

    fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

impl Mailer for RecordingMailer {
    async fn send_verification_email(
        &self,
        to: &Email,
        _name: &str,
        token: &str,
    ) -> AccountResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.as_str().to_string(), token.to_string()));
        Ok(())
    }
}

// ============================================================================
// Shared fixtures
// ============================================================================

const TEST_KEY: [u8; 24] = *b"abc&1*~#^2^#s0^=)^^7%b34";
const TEST_IV: [u8; 16] = [7u8; 16];

fn test_config() -> crate::AccountsConfig {
    crate::AccountsConfig {
        token_key: TEST_KEY,
        token_iv: TEST_IV,
        verification_url: "https://example.com/verify".to_string(),
        ..crate::AccountsConfig::default()
    }
}

fn test_codec() -> Arc<crate::infra::CfbTokenCodec> {
    Arc::new(crate::infra::CfbTokenCodec::new(TEST_KEY, TEST_IV))
}

// ============================================================================
// Session store contract
// ============================================================================

mod session_store_tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_get_after_create() {
        let store = InMemorySessionStore::new();

        let id = store.create("user@example.com", TTL).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), "user@example.com");
    }

    #[tokio::test]
    async fn test_expired_session_not_found() {
        let store = InMemorySessionStore::new();

        let id = store.create("user@example.com", TTL).await.unwrap();
        store.expire_now(&id);

        assert!(matches!(
            store.get(&id).await,
            Err(AccountError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_renew_keeps_session_alive() {
        let store = InMemorySessionStore::new();

        let id = store.create("user@example.com", TTL).await.unwrap();
        store.renew(&id, TTL).await.unwrap();
        assert!(store.get(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_renew_does_not_resurrect() {
        let store = InMemorySessionStore::new();

        let id = store.create("user@example.com", TTL).await.unwrap();
        store.expire_now(&id);

        assert!(matches!(
            store.renew(&id, TTL).await,
            Err(AccountError::SessionNotFound)
        ));
        assert!(store.get(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemorySessionStore::new();

        let id = store.create("user@example.com", TTL).await.unwrap();
        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let store = InMemorySessionStore::new();

        let a = store.create("user@example.com", TTL).await.unwrap();
        let b = store.create("user@example.com", TTL).await.unwrap();
        assert_ne!(a, b);
    }
}

// ============================================================================
// Use cases
// ============================================================================

mod use_case_tests {
    use super::*;
    use crate::application::{
        CheckSessionUseCase, SignInInput, SignInUseCase, VerifyEmailUseCase,
    };

    fn sign_in_use_case(
        sessions: &InMemorySessionStore,
        accounts: &InMemoryAccountStore,
    ) -> SignInUseCase<InMemorySessionStore, InMemoryAccountStore> {
        SignInUseCase::new(
            Arc::new(sessions.clone()),
            Arc::new(accounts.clone()),
            Arc::new(test_config()),
        )
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();
        accounts.seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let output = sign_in_use_case(&sessions, &accounts)
            .execute(SignInInput {
                email: "parent@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            sessions.get(&output.session_id).await.unwrap(),
            "parent@example.com"
        );
        assert_eq!(output.account.role, Role::Parent);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();
        accounts.seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let result = sign_in_use_case(&sessions, &accounts)
            .execute(SignInInput {
                email: "parent@example.com".to_string(),
                password: "wrong horse".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email() {
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();

        let result = sign_in_use_case(&sessions, &accounts)
            .execute(SignInInput {
                email: "nobody@example.com".to_string(),
                password: "whatever!".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_unverified_parent_rejected() {
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();
        accounts.seed_account(Role::Parent, "parent@example.com", "correct horse", false);

        let result = sign_in_use_case(&sessions, &accounts)
            .execute(SignInInput {
                email: "parent@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AccountError::EmailNotVerified)));
    }

    #[tokio::test]
    async fn test_sign_in_unverified_manager_allowed() {
        // Only parents gate login on verification
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();
        accounts.seed_account(Role::Manager, "manager@example.com", "correct horse", false);

        let result = sign_in_use_case(&sessions, &accounts)
            .execute(SignInInput {
                email: "manager@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_prolong_drops_session_of_deleted_account() {
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();
        let account =
            accounts.seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let session_id = sessions
            .create("parent@example.com", Duration::from_secs(60))
            .await
            .unwrap();

        accounts.remove_account(account.id);

        let use_case = CheckSessionUseCase::new(
            Arc::new(sessions.clone()),
            Arc::new(accounts.clone()),
            Arc::new(test_config()),
        );

        let result = use_case.prolong(&session_id).await;
        assert!(matches!(result, Err(AccountError::Unauthenticated)));

        // The stale session must be gone, not just rejected
        assert!(sessions.get(&session_id).await.is_err());
    }

    #[tokio::test]
    async fn test_verify_email_roundtrip() {
        let accounts = InMemoryAccountStore::new();
        accounts.seed_account(Role::Parent, "parent@example.com", "correct horse", false);

        let use_case = VerifyEmailUseCase::new(Arc::new(accounts.clone()), test_codec());

        let email = Email::from_db("parent@example.com");
        let token = use_case.issue(&email).unwrap();

        let account_id = use_case.redeem(&token).await.unwrap();
        let account = accounts.get_by_id(account_id).await.unwrap().unwrap();
        assert!(account.email_verified);

        // Redeeming twice is an idempotent success
        assert!(use_case.redeem(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_email_rejects_garbage() {
        let accounts = InMemoryAccountStore::new();
        let use_case = VerifyEmailUseCase::new(Arc::new(accounts), test_codec());

        assert!(matches!(
            use_case.redeem("not a token").await,
            Err(AccountError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_verify_email_rejects_unknown_account() {
        let accounts = InMemoryAccountStore::new();
        let use_case = VerifyEmailUseCase::new(Arc::new(accounts), test_codec());

        let token = use_case.issue(&Email::from_db("ghost@example.com")).unwrap();
        assert!(matches!(
            use_case.redeem(&token).await,
            Err(AccountError::InvalidToken)
        ));
    }
}

// ============================================================================
// Router and middleware
// ============================================================================

mod router_tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::presentation::router::accounts_router_generic;

    struct TestApp {
        router: Router,
        sessions: InMemorySessionStore,
        accounts: InMemoryAccountStore,
        mailer: RecordingMailer,
    }

    fn test_app() -> TestApp {
        let sessions = InMemorySessionStore::new();
        let accounts = InMemoryAccountStore::new();
        let mailer = RecordingMailer::new();

        let router = accounts_router_generic(
            sessions.clone(),
            accounts.clone(),
            mailer.clone(),
            test_codec(),
            test_config(),
        );

        TestApp {
            router,
            sessions,
            accounts,
            mailer,
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_cookie(uri: &str, session_id: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("session-id={session_id}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login(app: &TestApp, email: &str, password: &str) -> String {
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth",
                serde_json::json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        let (name_value, _) = cookie.split_once(';').unwrap();
        let (_, session_id) = name_value.split_once('=').unwrap();
        session_id.to_string()
    }

    /// Percent-encode base64 characters that query parsing would mangle
    fn encode_token(token: &str) -> String {
        token
            .replace('%', "%25")
            .replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D")
    }

    #[tokio::test]
    async fn test_protected_route_without_cookie() {
        let app = test_app();

        let response = app.router.clone().oneshot(get("/auth")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_with_unknown_cookie() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/auth", "bogus-session-id"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_with_expired_cookie() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let session_id = login(&app, "parent@example.com", "correct horse").await;
        app.sessions.expire_now(&session_id);

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/auth", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth",
                serde_json::json!({
                    "email": "parent@example.com",
                    "password": "correct horse"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("session-id="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/api/v1"));
        assert!(cookie.contains("Max-Age=1382400"));
    }

    #[tokio::test]
    async fn test_login_then_protected_route_renews_cookie() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let session_id = login(&app, "parent@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/auth", &session_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.contains(&session_id));
        assert!(cookie.contains("Max-Age=1382400"));
    }

    #[tokio::test]
    async fn test_logout_without_cookie_succeeds() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/auth")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.contains("Max-Age=-1"));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let session_id = login(&app, "parent@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/auth")
                    .header(header::COOKIE, format!("session-id={session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/auth", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_guards_reject_other_roles() {
        let app = test_app();
        let parent =
            app.accounts
                .seed_account(Role::Parent, "parent@example.com", "correct horse", true);
        app.accounts.seed_parent_profile(parent.id);

        let session_id = login(&app, "parent@example.com", "correct horse").await;

        // A parent passes the parent guard
        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/parent/children", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // ...and is rejected by every other guard
        for uri in ["/child", "/manager/child?child=1", "/admin/managers"] {
            let response = app
                .router
                .clone()
                .oneshot(get_with_cookie(uri, &session_id))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_parent_children_listing() {
        let app = test_app();
        let parent_account =
            app.accounts
                .seed_account(Role::Parent, "parent@example.com", "correct horse", true);
        let parent = app.accounts.seed_parent_profile(parent_account.id);

        let child_account =
            app.accounts
                .seed_account(Role::Child, "child@example.com", "correct horse", true);
        app.accounts
            .seed_child_profile(child_account.id, Some(parent.id));

        let session_id = login(&app, "parent@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/parent/children", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let children: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(children.as_array().unwrap().len(), 1);
        assert_eq!(children[0]["email"], "child@example.com");
    }

    #[tokio::test]
    async fn test_manager_child_lookup() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Manager, "manager@example.com", "correct horse", true);
        let child_account =
            app.accounts
                .seed_account(Role::Child, "child@example.com", "correct horse", true);
        app.accounts.seed_child_profile(child_account.id, None);

        let session_id = login(&app, "manager@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie(
                &format!("/manager/child?child={}", i64::from(child_account.id)),
                &session_id,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // An account id with no child profile is a 404
        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/manager/child?child=9999", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signup_verification_flow() {
        let app = test_app();

        // Parent signs up
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/parent",
                serde_json::json!({
                    "first_name": "Anna",
                    "second_name": "A",
                    "last_name": "Petrova",
                    "phone": "+70000000001",
                    "email": "anna@example.com",
                    "password": "correct horse"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Login is rejected until the email is verified
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/auth",
                serde_json::json!({
                    "email": "anna@example.com",
                    "password": "correct horse"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The verification mail was sent fire-and-forget; wait for the task
        let mut token = None;
        for _ in 0..50 {
            token = app.mailer.last_token_for("anna@example.com");
            if token.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let token = token.expect("verification email was not sent");

        // Redeem the token
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/email?token={}", encode_token(&token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Redeeming again still succeeds
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/email?token={}", encode_token(&token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Now login works
        login(&app, "anna@example.com", "correct horse").await;
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Parent, "anna@example.com", "correct horse", true);

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/parent",
                serde_json::json!({
                    "first_name": "Anna",
                    "second_name": "A",
                    "last_name": "Petrova",
                    "phone": "+70000000001",
                    "email": "anna@example.com",
                    "password": "correct horse"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_admin_creates_manager() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Admin, "admin@example.com", "correct horse", true);

        let session_id = login(&app, "admin@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/manager")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::COOKIE, format!("session-id={session_id}"))
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Max",
                            "second_name": "M",
                            "last_name": "Managerov",
                            "phone": "+70000000002",
                            "email": "max@example.com",
                            "password": "correct horse"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Managers are created pre-verified and can log in at once
        login(&app, "max@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/admin/managers", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let managers: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(managers.as_array().unwrap().len(), 1);
        assert_eq!(managers[0]["email"], "max@example.com");
        assert!(managers[0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_parent_profile_created_on_first_access() {
        let app = test_app();
        app.accounts
            .seed_account(Role::Parent, "parent@example.com", "correct horse", true);

        let session_id = login(&app, "parent@example.com", "correct horse").await;

        let response = app
            .router
            .clone()
            .oneshot(get_with_cookie("/parent", &session_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parent: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parent["email"], "parent@example.com");
        assert_eq!(parent["passport_verified"], false);
    }
}
