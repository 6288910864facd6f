//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use kernel::id::AccountId;

use crate::application::config::AccountsConfig;
use crate::application::{
    CheckSessionUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
    VerifyEmailUseCase,
};
use crate::domain::repository::{AccountStore, Mailer, SessionStore, TokenCodec};
use crate::error::{AccountError, AccountResult};
use crate::presentation::dto::{
    AccountResponse, ChildQuery, ChildResponse, Credentials, ParentQuery, ParentResponse,
    SignUpRequest, VerifyEmailQuery,
};
use crate::presentation::middleware::{CurrentAccount, CurrentChild, CurrentParent};

/// Shared state for account handlers and middleware
#[derive(Clone)]
pub struct AccountsState<S, A, M>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    pub sessions: Arc<S>,
    pub accounts: Arc<A>,
    pub mailer: Arc<M>,
    pub codec: Arc<dyn TokenCodec>,
    pub config: Arc<AccountsConfig>,
}

impl<S, A, M> AccountsState<S, A, M>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    pub fn check_session(&self) -> CheckSessionUseCase<S, A> {
        CheckSessionUseCase::new(
            self.sessions.clone(),
            self.accounts.clone(),
            self.config.clone(),
        )
    }

    fn sign_in(&self) -> SignInUseCase<S, A> {
        SignInUseCase::new(
            self.sessions.clone(),
            self.accounts.clone(),
            self.config.clone(),
        )
    }

    fn sign_out(&self) -> SignOutUseCase<S> {
        SignOutUseCase::new(self.sessions.clone())
    }

    fn sign_up(&self) -> SignUpUseCase<A, M> {
        SignUpUseCase::new(
            self.accounts.clone(),
            self.mailer.clone(),
            self.codec.clone(),
        )
    }

    fn verify_email(&self) -> VerifyEmailUseCase<A> {
        VerifyEmailUseCase::new(self.accounts.clone(), self.codec.clone())
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// POST /api/v1/user/auth
pub async fn create_session<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Json(credentials): Json<Credentials>,
) -> AccountResult<impl IntoResponse>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(AccountError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let output = state
        .sign_in()
        .execute(SignInInput {
            email: credentials.email,
            password: credentials.password,
        })
        .await?;

    let cookie = state.config.cookie.build_set_cookie(&output.session_id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AccountResponse::from(output.account)),
    ))
}

/// DELETE /api/v1/user/auth
///
/// Logging out without a cookie is a success: there is nothing to end.
pub async fn delete_session<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    headers: HeaderMap,
) -> AccountResult<impl IntoResponse>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    if let Some(session_id) =
        platform::cookie::extract_cookie(&headers, &state.config.cookie.name)
    {
        state.sign_out().execute(&session_id).await?;
    }

    let cookie = state.config.cookie.build_delete_cookie();

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /api/v1/user/auth (auth)
///
/// The middleware has already renewed the session and rewritten the
/// cookie; this just echoes the account.
pub async fn check_session<S, A, M>(
    State(_state): State<AccountsState<S, A, M>>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> AccountResult<Json<AccountResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    Ok(Json(AccountResponse::from(account)))
}

// ============================================================================
// Parent registration
// ============================================================================

/// POST /api/v1/user/parent
pub async fn sign_up_parent<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Json(req): Json<SignUpRequest>,
) -> AccountResult<Json<AccountResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let account = state
        .sign_up()
        .sign_up_parent(SignUpInput {
            first_name: req.first_name,
            second_name: req.second_name,
            last_name: req.last_name,
            phone: req.phone,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(AccountResponse::from(account)))
}

/// GET /api/v1/user/parent (auth)
///
/// The profile row is created lazily on first access: signup only
/// creates the account.
pub async fn get_parent<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> AccountResult<Json<ParentResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let parent = match state.accounts.parent_profile(account.id).await? {
        Some(parent) => parent,
        None => {
            tracing::info!(account_id = %account.id, "Creating parent profile on first access");
            state.accounts.create_parent_profile(account.id).await?
        }
    };

    Ok(Json(ParentResponse::from(parent)))
}

/// GET /api/v1/user/parent/children (auth + parent)
pub async fn get_parent_children<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Extension(CurrentParent(parent)): Extension<CurrentParent>,
) -> AccountResult<Json<Vec<ChildResponse>>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let children = state.accounts.children_of(parent.id).await?;

    Ok(Json(children.into_iter().map(ChildResponse::from).collect()))
}

// ============================================================================
// Child
// ============================================================================

/// GET /api/v1/user/child (auth + child)
pub async fn get_child<S, A, M>(
    State(_state): State<AccountsState<S, A, M>>,
    Extension(CurrentChild(child)): Extension<CurrentChild>,
) -> AccountResult<Json<ChildResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    Ok(Json(ChildResponse::from(child)))
}

// ============================================================================
// Email verification
// ============================================================================

/// GET /api/v1/user/email?token=
pub async fn verify_email<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Query(query): Query<VerifyEmailQuery>,
) -> AccountResult<StatusCode>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    if query.token.is_empty() {
        return Err(AccountError::Validation("Empty token".to_string()));
    }

    state.verify_email().redeem(&query.token).await?;

    Ok(StatusCode::OK)
}

/// POST /api/v1/user/email
pub async fn resend_verification<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Json(credentials): Json<Credentials>,
) -> AccountResult<StatusCode>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(AccountError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    state
        .sign_up()
        .resend_verification(&credentials.email, &credentials.password)
        .await?;

    Ok(StatusCode::OK)
}

// ============================================================================
// Admin
// ============================================================================

/// POST /api/v1/user/admin/manager (auth + admin)
pub async fn sign_up_manager<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Json(req): Json<SignUpRequest>,
) -> AccountResult<Json<AccountResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let account = state
        .sign_up()
        .sign_up_manager(SignUpInput {
            first_name: req.first_name,
            second_name: req.second_name,
            last_name: req.last_name,
            phone: req.phone,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(AccountResponse::from(account)))
}

/// GET /api/v1/user/admin/managers (auth + admin)
pub async fn get_managers<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
) -> AccountResult<Json<Vec<AccountResponse>>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let managers = state.accounts.managers().await?;

    Ok(Json(
        managers.into_iter().map(AccountResponse::from).collect(),
    ))
}

// ============================================================================
// Manager
// ============================================================================

/// GET /api/v1/user/manager/child?child= (auth + manager)
pub async fn get_child_for_manager<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Query(query): Query<ChildQuery>,
) -> AccountResult<Json<ChildResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let child = state
        .accounts
        .child_profile(AccountId::from(query.child))
        .await?
        .ok_or(AccountError::ProfileNotFound)?;

    Ok(Json(ChildResponse::from(child)))
}

/// GET /api/v1/user/manager/parent?parent= (auth + manager)
pub async fn get_parent_for_manager<S, A, M>(
    State(state): State<AccountsState<S, A, M>>,
    Query(query): Query<ParentQuery>,
) -> AccountResult<Json<ParentResponse>>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let parent = state
        .accounts
        .parent_profile(AccountId::from(query.parent))
        .await?
        .ok_or(AccountError::ProfileNotFound)?;

    Ok(Json(ParentResponse::from(parent)))
}
