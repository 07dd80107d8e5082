use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use domain::services::{
    GuestDirectory, GuestLookup, RsvpNotifier, RsvpSubmitter, WorkflowServices,
};
use persistence::PgGuestDirectory;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{guests, health, rsvp_sessions};
use crate::services::{EmailRsvpNotifier, EmailService, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<dyn GuestDirectory>,
    pub workflow: WorkflowServices,
    pub sessions: Arc<SessionStore>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Wires the workflow services around the given directory and notifier.
    pub fn new(
        config: Config,
        directory: Arc<dyn GuestDirectory>,
        notifier: Arc<dyn RsvpNotifier>,
    ) -> Self {
        let config = Arc::new(config);
        let catalog = Arc::new(config.events.catalog());

        let workflow = WorkflowServices {
            lookup: GuestLookup::new(Arc::clone(&directory), config.rsvp.directory_timeout()),
            submitter: RsvpSubmitter::new(
                Arc::clone(&directory),
                notifier,
                config.rsvp.directory_timeout(),
                config.rsvp.notification_timeout(),
            ),
            catalog,
            max_text_length: config.rsvp.max_text_length,
        };

        // Rate limiting is disabled when rate_limit_per_minute is 0
        let rate_limiter = (config.security.rate_limit_per_minute > 0).then(|| {
            Arc::new(RateLimiterState::new(
                config.security.rate_limit_per_minute,
            ))
        });

        let sessions = Arc::new(SessionStore::new(
            config.rsvp.session_ttl(),
            config.rsvp.max_sessions,
        ));

        Self {
            config,
            directory,
            workflow,
            sessions,
            rate_limiter,
        }
    }

    /// Production wiring: PostgreSQL directory and email notifier.
    pub fn with_pool(config: Config, pool: PgPool) -> Self {
        let catalog = Arc::new(config.events.catalog());
        let email = EmailService::new(config.email.clone(), config.rsvp.notification_timeout());
        let notifier = Arc::new(EmailRsvpNotifier::new(email, catalog));
        let directory = Arc::new(PgGuestDirectory::new(pool));
        Self::new(config, directory, notifier)
    }
}

pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

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

    // Guest-facing routes are public and rate limited per client
    let guest_routes = Router::new()
        .route("/api/v1/guests/search", get(guests::search_guests))
        .route("/api/v1/rsvp/sessions", post(rsvp_sessions::create_session))
        .route("/api/v1/rsvp/sessions/:session_id", get(rsvp_sessions::get_session))
        .route(
            "/api/v1/rsvp/sessions/:session_id/search",
            post(rsvp_sessions::search),
        )
        .route(
            "/api/v1/rsvp/sessions/:session_id/select",
            post(rsvp_sessions::select_invitation),
        )
        .route(
            "/api/v1/rsvp/sessions/:session_id/answers",
            patch(rsvp_sessions::update_answers),
        )
        .route("/api/v1/rsvp/sessions/:session_id/next", post(rsvp_sessions::next_step))
        .route(
            "/api/v1/rsvp/sessions/:session_id/previous",
            post(rsvp_sessions::previous_step),
        )
        .route(
            "/api/v1/rsvp/sessions/:session_id/restart",
            post(rsvp_sessions::restart),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(guest_routes)
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
