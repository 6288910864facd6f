//! Accounts Router
//!
//! Routes are grouped by their middleware stack and merged. Layer
//! order matters: `with_auth` is added last so it runs before the role
//! guards.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::domain::repository::{AccountStore, Mailer, SessionStore, TokenCodec};
use crate::infra::codec::CfbTokenCodec;
use crate::infra::postgres::PgAccountStore;
use crate::infra::redis::RedisSessionStore;
use crate::infra::smtp::SmtpMailer;
use crate::presentation::handlers::{self, AccountsState};
use crate::presentation::middleware;

/// Create the accounts router with the production store implementations
pub fn accounts_router(
    sessions: RedisSessionStore,
    accounts: PgAccountStore,
    mailer: SmtpMailer,
    config: AccountsConfig,
) -> Router {
    let codec = Arc::new(CfbTokenCodec::new(config.token_key, config.token_iv));

    accounts_router_generic(sessions, accounts, mailer, codec, config)
}

/// Create a generic accounts router for any store implementations
pub fn accounts_router_generic<S, A, M>(
    sessions: S,
    accounts: A,
    mailer: M,
    codec: Arc<dyn TokenCodec>,
    config: AccountsConfig,
) -> Router
where
    S: SessionStore + Clone + Send + Sync + 'static,
    A: AccountStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let state = AccountsState {
        sessions: Arc::new(sessions),
        accounts: Arc::new(accounts),
        mailer: Arc::new(mailer),
        codec,
        config: Arc::new(config),
    };

    let public = Router::new()
        .route(
            "/auth",
            post(handlers::create_session::<S, A, M>)
                .delete(handlers::delete_session::<S, A, M>),
        )
        .route("/parent", post(handlers::sign_up_parent::<S, A, M>))
        .route(
            "/email",
            get(handlers::verify_email::<S, A, M>)
                .post(handlers::resend_verification::<S, A, M>),
        );

    let authenticated = Router::new()
        .route("/auth", get(handlers::check_session::<S, A, M>))
        .route("/parent", get(handlers::get_parent::<S, A, M>))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::with_auth::<S, A, M>,
        ));

    let parent_only = Router::new()
        .route(
            "/parent/children",
            get(handlers::get_parent_children::<S, A, M>),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_parent::<S, A, M>,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::with_auth::<S, A, M>,
        ));

    let child_only = Router::new()
        .route("/child", get(handlers::get_child::<S, A, M>))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_child::<S, A, M>,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::with_auth::<S, A, M>,
        ));

    let manager_only = Router::new()
        .route(
            "/manager/child",
            get(handlers::get_child_for_manager::<S, A, M>),
        )
        .route(
            "/manager/parent",
            get(handlers::get_parent_for_manager::<S, A, M>),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_manager::<S, A, M>,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::with_auth::<S, A, M>,
        ));

    let admin_only = Router::new()
        .route("/admin/manager", post(handlers::sign_up_manager::<S, A, M>))
        .route("/admin/managers", get(handlers::get_managers::<S, A, M>))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_admin::<S, A, M>,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::with_auth::<S, A, M>,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(parent_only)
        .merge(child_only)
        .merge(manager_only)
        .merge(admin_only)
        .with_state(state)
}
