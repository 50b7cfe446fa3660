use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::analyzer::Analyzer;
use crate::clients::{
    catalog::CatalogProvider,
    errors::{Error, Result},
    token_storage::TokenStore,
};
use crate::web::{AppState, pages, session};

/// Landing page with the login link.
pub async fn index() -> Html<String> {
    Html(pages::index())
}

/// Liveness check with the running version.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Sends the browser to Spotify's consent page.
///
/// The `state` parameter is a fresh nonce remembered in a short-lived cookie,
/// never the session id.
pub async fn login<S: TokenStore, P: CatalogProvider>(
    State(state): State<AppState<S, P>>,
) -> Result<Response> {
    let nonce = session::new_session_id();
    let url = state.provider().authorize_url(&nonce)?;
    Ok((
        [(header::SET_COOKIE, session::state_cookie(&nonce))],
        Redirect::to(&url),
    )
        .into_response())
}

/// Query string Spotify appends when redirecting back.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Completes the OAuth flow and starts a new session for the token.
pub async fn callback<S: TokenStore, P: CatalogProvider>(
    State(state): State<AppState<S, P>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        warn!("Spotify authorization was denied: {error}");
        return Ok((StatusCode::BAD_REQUEST, Html("<h4>Login failed.</h4>")).into_response());
    }
    let Some(code) = params.code else {
        return Ok((StatusCode::BAD_REQUEST, Html("<h4>Missing authorization code.</h4>"))
            .into_response());
    };
    let expected = session::oauth_state(&headers).ok_or(Error::InvalidState)?;
    if params.state.as_deref() != Some(expected.as_str()) {
        return Err(Error::InvalidState);
    }

    let token = state.provider().exchange_code(&code).await?;

    // a session id seen before login is never trusted with the new token
    if let Some(previous) = session::session_id(&headers) {
        state.tokens().remove(&previous).await?;
    }
    let session_id = session::new_session_id();
    state.tokens().save(&session_id, &token).await?;
    info!("New Spotify session authorized");

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session::session_cookie(&session_id)),
            (header::SET_COOKIE, session::clear_state_cookie()),
        ]),
        Redirect::to("/analyze"),
    )
        .into_response())
}

/// Playlist name form.
pub async fn analyze_form() -> Html<String> {
    Html(pages::analyze(None))
}

/// Body of the playlist name form.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    playlist_name: String,
}

/// Analyzes the named playlist of the session's user and shows the result.
///
/// An unknown name re-renders the form with the error; a session without a
/// usable token goes back to `/login`.
pub async fn analyze<S: TokenStore, P: CatalogProvider>(
    State(state): State<AppState<S, P>>,
    headers: HeaderMap,
    Form(form): Form<AnalyzeForm>,
) -> Result<Response> {
    let Some(session_id) = session::session_id(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };
    let Some(token) = state.tokens().load(&session_id).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let playlist_name = form.playlist_name.trim();
    let catalog = state.provider().catalog_for(token);
    let result = Analyzer::new(&catalog, state.analyzer())
        .analyze(playlist_name)
        .await;

    if let Err(Error::Unauthorized) = result {
        warn!("Spotify rejected the session's token, asking for a new login");
        state.tokens().remove(&session_id).await?;
        return Ok(Redirect::to("/login").into_response());
    }

    // rspotify may have refreshed the token while serving the request
    if let Some(token) = P::current_token(&catalog).await? {
        state.tokens().save(&session_id, &token).await?;
    }

    match result {
        Ok(analysis) => Ok(Html(pages::show_genres(&analysis)).into_response()),
        Err(err @ Error::PlaylistNotFound(_)) => {
            info!("{err}");
            Ok(Html(pages::analyze(Some(&err.to_string()))).into_response())
        }
        Err(err) => Err(err),
    }
}

/// Forgets the session's token.
pub async fn logout<S: TokenStore, P: CatalogProvider>(
    State(state): State<AppState<S, P>>,
    headers: HeaderMap,
) -> Result<Redirect> {
    if let Some(session_id) = session::session_id(&headers) {
        state.tokens().remove(&session_id).await?;
    }
    Ok(Redirect::to("/"))
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Serves a chart saved under the image directory.
pub async fn image<S: TokenStore, P: CatalogProvider>(
    State(state): State<AppState<S, P>>,
    Path(file_name): Path<String>,
) -> Result<Response> {
    if !is_safe_file_name(&file_name) {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }
    let path = state.analyzer().image_dir.join(&file_name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(StatusCode::NOT_FOUND.into_response());
        }
        Err(e) => return Err(e.into()),
    };
    let content_type = if file_name.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
