//! Auth and Role Middleware
//!
//! `with_auth` validates and renews the session, attaching the account
//! to the request as a typed extension. The role guards run inside it
//! and check the attached account, loading the parent/child profile
//! where the handler needs one.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::entity::{Account, Child, Parent};
use crate::domain::repository::{AccountStore, Mailer, SessionStore};
use crate::domain::value_object::Role;
use crate::error::{AccountError, AccountResult};
use crate::presentation::handlers::AccountsState;

/// Authenticated account, attached by `with_auth`
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Parent profile, attached by `require_parent`
#[derive(Debug, Clone)]
pub struct CurrentParent(pub Parent);

/// Child profile, attached by `require_child`
#[derive(Debug, Clone)]
pub struct CurrentChild(pub Child);

/// Middleware that requires a valid session
///
/// Renews the session TTL (sliding window), resolves the account, and
/// rewrites the session cookie on the response with the fresh Max-Age.
pub async fn with_auth<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AccountError>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let session_id =
        platform::cookie::extract_cookie(req.headers(), &state.config.cookie.name)
            .ok_or(AccountError::Unauthenticated)?;

    let account = state
        .check_session()
        .prolong(&session_id)
        .await
        .map_err(|e| match e {
            AccountError::SessionNotFound => AccountError::Unauthenticated,
            other => other,
        })?;

    req.extensions_mut().insert(CurrentAccount(account));

    let mut response = next.run(req).await;

    // The session was renewed above; the cookie must carry the same TTL
    let cookie = state.config.cookie.build_set_cookie(&session_id);
    if let Ok(value) = cookie.parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Middleware that requires the parent role and attaches the profile
pub async fn require_parent<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AccountError>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let account = require_role(&req, Role::Parent)?;

    let parent = state
        .accounts
        .parent_profile(account.id)
        .await?
        .ok_or_else(|| AccountError::Internal("Parent account has no profile".to_string()))?;

    req.extensions_mut().insert(CurrentParent(parent));

    Ok(next.run(req).await)
}

/// Middleware that requires the child role and attaches the profile
pub async fn require_child<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AccountError>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let account = require_role(&req, Role::Child)?;

    let child = state
        .accounts
        .child_profile(account.id)
        .await?
        .ok_or_else(|| AccountError::Internal("Child account has no profile".to_string()))?;

    req.extensions_mut().insert(CurrentChild(child));

    Ok(next.run(req).await)
}

/// Middleware that requires the manager role
pub async fn require_manager<S, A, M>(
    State(_state): State<AccountsState<S, A, M>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AccountError>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    require_role(&req, Role::Manager)?;

    Ok(next.run(req).await)
}

/// Middleware that requires the admin role
pub async fn require_admin<S, A, M>(
    State(_state): State<AccountsState<S, A, M>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AccountError>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    require_role(&req, Role::Admin)?;

    Ok(next.run(req).await)
}

/// Check the attached account against an expected role
///
/// A missing `CurrentAccount` means the guard ran without `with_auth`
/// in front of it; rejected rather than trusted.
fn require_role(req: &Request<Body>, expected: Role) -> AccountResult<Account> {
    let account = req
        .extensions()
        .get::<CurrentAccount>()
        .ok_or(AccountError::Forbidden("no authenticated account"))?
        .0
        .clone();

    if account.role != expected {
        return Err(AccountError::Forbidden("role not allowed"));
    }

    Ok(account)
}
