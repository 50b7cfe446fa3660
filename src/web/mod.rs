//! HTTP surface: login through Spotify, pick a playlist, look at its genre chart.

/// Route handlers
pub mod handlers;
/// HTML pages
pub mod pages;
/// Session cookie handling
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use log::{error, info};

use crate::analyzer::AnalyzerConfig;
use crate::clients::{
    catalog::CatalogProvider,
    errors::{Error, Result},
    spotify::SpotifyAuth,
    token_storage::{DuckDbTokenStore, InMemoryTokenStore, TokenStore, TokenStoreKind},
};
use crate::config::AppConfig;

struct Shared<S, P> {
    provider: P,
    tokens: S,
    analyzer: AnalyzerConfig,
}

/// Per-application context handed to every handler
pub struct AppState<S, P = SpotifyAuth> {
    shared: Arc<Shared<S, P>>,
}

impl<S, P> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        AppState {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: TokenStore, P: CatalogProvider> AppState<S, P> {
    /// Context over a catalog provider, a token store and the analysis settings.
    pub fn new(provider: P, tokens: S, analyzer: AnalyzerConfig) -> Self {
        AppState {
            shared: Arc::new(Shared {
                provider,
                tokens,
                analyzer,
            }),
        }
    }

    /// Authorization and per-user catalogs
    pub fn provider(&self) -> &P {
        &self.shared.provider
    }

    /// Session tokens
    pub fn tokens(&self) -> &S {
        &self.shared.tokens
    }

    /// Where charts go and whether artist lookups are memoized
    pub fn analyzer(&self) -> &AnalyzerConfig {
        &self.shared.analyzer
    }
}

/// All routes of the web app over the given context.
pub fn router<S: TokenStore, P: CatalogProvider>(state: AppState<S, P>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/login", get(handlers::login::<S, P>))
        .route("/callback", get(handlers::callback::<S, P>))
        .route(
            "/analyze",
            get(handlers::analyze_form).post(handlers::analyze::<S, P>),
        )
        .route("/logout", get(handlers::logout::<S, P>))
        .route("/images/{file_name}", get(handlers::image::<S, P>))
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized => Redirect::to("/login").into_response(),
            Error::InvalidState | Error::InvalidId(_) => {
                (StatusCode::BAD_REQUEST, Html(format!("<h4>{self}</h4>"))).into_response()
            }
            Error::PlaylistNotFound(_) => {
                (StatusCode::NOT_FOUND, Html(format!("<h4>{self}</h4>"))).into_response()
            }
            err => {
                error!("Request failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h4>Something went wrong. Please try again.</h4>"),
                )
                    .into_response()
            }
        }
    }
}

async fn run<S: TokenStore>(config: &AppConfig, auth: SpotifyAuth, tokens: S) -> Result<()> {
    let state = AppState::new(auth, tokens, config.analyzer.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.address).await?;
    info!("Listening on http://{}", config.address);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(config: AppConfig) -> Result<()> {
    let auth = SpotifyAuth::from_env()?;
    match &config.token_store {
        TokenStoreKind::Memory => run(&config, auth, InMemoryTokenStore::new()).await,
        TokenStoreKind::DuckDb(path) => {
            let tokens = DuckDbTokenStore::open(path).await?;
            run(&config, auth, tokens).await
        }
    }
}
