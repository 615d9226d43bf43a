//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the counter handler
//! - Wire up middleware (tracing, timeout, concurrency bound, request ID)
//! - Bind server to listener
//! - Swap store client and adapter profile on config reload
//! - Stop on the shutdown broadcast

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use arc_swap::ArcSwap;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::CounterConfig;
use crate::counter::CounterService;
use crate::http::adapter::AdapterProfile;
use crate::http::dispatch;
use crate::http::request::{CounterRequest, MakeRequestUuidV4, X_REQUEST_ID};
use crate::observability::metrics;
use crate::store::{build_store, DocumentStore, StoreResult};

/// Everything a request needs, replaced wholesale on reload.
pub struct ServiceState {
    pub config: CounterConfig,
    pub profile: AdapterProfile,
    pub service: CounterService,
}

impl ServiceState {
    /// Build state with the store the configuration selects.
    pub fn from_config(config: CounterConfig) -> StoreResult<Self> {
        let store = build_store(&config.store)?;
        Ok(Self::with_store(config, store))
    }

    /// Build state around an existing store.
    pub fn with_store(config: CounterConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profile: AdapterProfile::from_config(&config.adapter),
            service: CounterService::new(store),
            config,
        }
    }

    /// State for a new configuration. The store client is kept when its
    /// settings did not change.
    fn reload(&self, config: CounterConfig) -> StoreResult<Self> {
        if config.store == self.config.store {
            Ok(Self::with_store(config, self.service.store().clone()))
        } else {
            Self::from_config(config)
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<ServiceState>>,
}

impl AppState {
    pub fn new(state: ServiceState) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(state)),
        }
    }

    /// Install a new configuration, keeping the current one if it cannot be applied.
    pub fn apply_config(&self, config: CounterConfig) {
        let current = self.inner.load_full();
        if config.listener != current.config.listener || config.timeouts != current.config.timeouts {
            tracing::warn!("Listener and timeout changes take effect after restart");
        }

        match current.reload(config) {
            Ok(next) => {
                tracing::info!(
                    adapter = ?next.profile.kind(),
                    store_backend = ?next.config.store.backend,
                    "Configuration reloaded"
                );
                self.inner.store(Arc::new(next));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to apply new configuration, keeping current");
            }
        }
    }
}

/// HTTP server for the counter service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: CounterConfig) -> StoreResult<Self> {
        Ok(Self::from_state(ServiceState::from_config(config)?))
    }

    /// Create a server around an existing store.
    pub fn with_store(config: CounterConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self::from_state(ServiceState::with_store(config, store))
    }

    fn from_state(state: ServiceState) -> Self {
        let config = state.config.clone();
        let state = AppState::new(state);
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CounterConfig, state: AppState) -> Router {
        let permits = Arc::new(Semaphore::new(config.listener.max_concurrent_requests));

        Router::new()
            .route("/", any(counter_handler))
            .route("/{*path}", any(counter_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(permits, limit_concurrency))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations arriving on `config_updates` are applied live; the
    /// server stops once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<CounterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            adapter = ?self.state.inner.load().profile.kind(),
            "HTTP server starting"
        );

        let reload_state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                reload_state.apply_config(config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Bound the number of requests in flight.
async fn limit_concurrency(
    State(permits): State<Arc<Semaphore>>,
    request: Request,
    next: Next,
) -> Response {
    let _permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
    };
    next.run(request).await
}

/// Single entry point for every path and method.
async fn counter_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let current = state.inner.load_full();

    let request = CounterRequest::parse(&current.profile, &method, &uri, &headers);
    tracing::debug!(
        operation = request.label(),
        key = %request.key,
        client_ip = %request.client_ip,
        "Dispatching request"
    );

    let today = Utc::now().date_naive();
    let response = dispatch::apply(&current.service, &current.profile, &request, today).await;

    metrics::record_request(request.label(), response.status().as_u16(), start);
    response.into_response()
}
