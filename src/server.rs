pub mod errors;
pub mod extract;
pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use color_eyre::eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenService};
use crate::config::{AuthConfig, ServerConfig};
use crate::domain::service::{AnnouncementService, DocumentService, UserService};
use crate::store::Store;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub documents: DocumentService,
    pub announcements: AnnouncementService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: &AuthConfig) -> Self {
        Self {
            users: UserService::new(
                store.clone(),
                PasswordHasher::new(auth.password_iterations),
            ),
            documents: DocumentService::new(store.clone()),
            announcements: AnnouncementService::new(store.clone()),
            tokens: TokenService::new(&auth.jwt_secret, auth.token_ttl(), store),
        }
    }
}

pub struct Server {
    router: Router,
    listener: TcpListener,
}

impl Server {
    /// Builds the router and binds the listener. Port `0` picks a free port.
    pub async fn new(state: AppState, config: &ServerConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .wrap_err_with(|| format!("Failed to bind {addr}"))?;

        Ok(Self {
            router: router(state, cors_layer(&config.allowed_origins)),
            listener,
        })
    }

    /// The port the server is bound to.
    pub fn port(&self) -> Result<u16> {
        Ok(self
            .listener
            .local_addr()
            .wrap_err("Getting local address")?
            .port())
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!("Listening on http://{}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .wrap_err("Server error")
    }
}

/// The full application router with its middleware.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &'_ axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("request", method = %request.method(), uri)
        });

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", handlers::routes())
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_credentials(true)
}
