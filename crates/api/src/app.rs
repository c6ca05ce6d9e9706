use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::backends::Stores;
use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, public_site_middleware, rate_limit_middleware,
    require_user_auth, security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{self, guests, health, media, photos, public_sites, rsvps, session, site};
use crate::services::{build_object_storage, CookieHelper};
use domain::services::{RsvpService, SiteService};
use domain::stores::{GuestLedger, ObjectStorage};
use shared::jwt::{JwtConfig, JwtError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sites: SiteService,
    pub rsvps: RsvpService,
    pub guests: Arc<dyn GuestLedger>,
    pub storage: Arc<dyn ObjectStorage>,
    /// Verifies owner tokens; built once at startup.
    pub jwt: Arc<JwtConfig>,
    pub cookies: CookieHelper,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub pool: Option<PgPool>,
}

/// Failure to assemble the application from its configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("media storage: {0}")]
    Storage(#[from] domain::StorageError),
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Result<Self, StartupError> {
        let jwt = JwtConfig::verifier(&config.jwt.public_key, config.jwt.leeway_secs)?;
        let storage = build_object_storage(&config.media)?;
        Ok(Self::with_parts(config, stores, storage, jwt))
    }

    /// Assembles state from already built parts.
    pub fn with_parts(
        config: Config,
        stores: Stores,
        storage: Arc<dyn ObjectStorage>,
        jwt: JwtConfig,
    ) -> Self {
        let sites = SiteService::new(
            stores.sites.clone(),
            stores.inbox.clone(),
            config.sites.read_retry_delay(),
        );
        let rsvps = RsvpService::new(
            stores.sites,
            stores.inbox,
            stores.guests.clone(),
            config.sites.rsvp_settings(),
        );
        let rate_limiter =
            RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);
        let cookies = CookieHelper::new(config.cookies.clone());

        Self {
            config: Arc::new(config),
            sites,
            rsvps,
            guests: stores.guests,
            storage,
            jwt: Arc::new(jwt),
            cookies,
            rate_limiter,
            pool: stores.pool,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Owner routes (require JWT)
    let owner_routes = Router::new()
        .route("/api/v1/site", get(site::get_site).put(site::save_site))
        .route("/api/v1/site/rsvps", get(rsvps::list_rsvps))
        .route(
            "/api/v1/site/photos/album/:index",
            delete(photos::delete_album_photo),
        )
        .route("/api/v1/guests", get(guests::list_guests).post(guests::create_guest))
        .route(
            "/api/v1/guests/:guest_id",
            patch(guests::update_guest).delete(guests::delete_guest),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Photo uploads get their own body limit
    let upload_routes = Router::new()
        .route("/api/v1/site/photos/hero", post(photos::upload_hero))
        .route("/api/v1/site/photos/album", post(photos::upload_album_photo))
        .layer(DefaultBodyLimit::max(photos::body_limit(&config.media)))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // The extractor checks the token on POST; logout needs none
    let session_routes = Router::new().route(
        "/api/v1/session",
        post(session::create_session).delete(session::delete_session),
    );

    // Anonymous JSON API
    let public_api_routes = Router::new()
        .route("/api/v1/public/sites/:slug", get(public_sites::get_public_site))
        .route(
            "/api/v1/public/sites/:slug/rsvps",
            post(public_sites::submit_rsvp).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            )),
        );

    let media_route = format!("{}/*path", config.media.public_path.trim_end_matches('/'));
    let infra_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route(&media_route, get(media::serve_media));

    Router::new()
        .merge(infra_routes)
        .merge(public_api_routes)
        .merge(owner_routes)
        .merge(upload_routes)
        .merge(session_routes)
        .fallback(routes::fallback)
        // Public sites are resolved first, ahead of every router above
        .layer(middleware::from_fn_with_state(
            state.clone(),
            public_site_middleware,
        ))
        // Outside the public branch so its form posts get the configured limit
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
