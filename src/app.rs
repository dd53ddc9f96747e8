use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::auth::PrincipalBootstrap;
use crate::config::{AppConfig, TenantConfig};
use crate::database::{HoldingStore, PrincipalStore};
use crate::handlers::{protected, public};
use crate::middleware::{single_tenant_auth, AuthSettings};

/// Shared handles every handler and the auth gate work from
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthSettings>,
    pub bootstrap: Arc<PrincipalBootstrap>,
    pub principals: Arc<dyn PrincipalStore>,
    pub holdings: Arc<dyn HoldingStore>,
    pub token_expiry_hours: u64,
}

impl AppState {
    pub fn from_config<S>(store: Arc<S>, config: &AppConfig) -> Self
    where
        S: PrincipalStore + HoldingStore + 'static,
    {
        Self::new(
            store,
            AuthSettings::from_config(config),
            config.tenant.clone(),
            config.security.jwt_expiry_hours,
        )
    }

    pub fn new<S>(store: Arc<S>, auth: AuthSettings, tenant: TenantConfig, token_expiry_hours: u64) -> Self
    where
        S: PrincipalStore + HoldingStore + 'static,
    {
        let principals: Arc<dyn PrincipalStore> = store.clone();
        let holdings: Arc<dyn HoldingStore> = store;

        Self {
            auth: Arc::new(auth),
            bootstrap: Arc::new(PrincipalBootstrap::new(principals.clone(), tenant)),
            principals,
            holdings,
            token_expiry_hours,
        }
    }
}

/// Routes and the auth gate, without the global HTTP layers
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/token", post(public::auth::token_post))
        // Protected: every /api route passes the single-tenant gate
        .merge(api_routes(state.clone()))
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, holdings, portfolio};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/holdings", get(holdings::list).post(holdings::create))
        .route(
            "/api/holdings/:id",
            get(holdings::show).put(holdings::update).delete(holdings::delete),
        )
        .route("/api/portfolio/summary", get(portfolio::summary))
        .route_layer(middleware::from_fn_with_state(state, single_tenant_auth))
}

/// Full application: routes plus CORS, body limit and request tracing
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut app = router(state).layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        let origins: Vec<HeaderValue> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );
    }

    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}
