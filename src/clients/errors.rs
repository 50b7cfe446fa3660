use rspotify::{ClientError, http::HttpError, model::IdError};
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can fail while analyzing a playlist or serving the web app
#[derive(Error, Debug)]
pub enum Error {
    /// No playlist of the user has this name
    #[error("{0} does not exist. Please try again.")]
    PlaylistNotFound(String),

    /// The genre lookup of an artist failed; the whole aggregation fails with it
    #[error("Genre lookup failed for artist {artist_id}: {reason}")]
    LookupFailure {
        /// Artist whose genres were requested
        artist_id: String,
        /// Transport or API error text
        reason: String,
    },

    /// Any other Spotify API failure
    #[error("Spotify error: {0}")]
    SpotifyError(ClientError),

    /// A Spotify id or URI could not be parsed
    #[error("Invalid Spotify id: {0}")]
    InvalidId(#[from] IdError),

    /// Missing or malformed settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Token database failure
    #[error("Storage error: {0}")]
    StorageError(#[from] async_duckdb::Error),

    /// A stored token could not be (de)serialized
    #[error("Token serialization error: {0}")]
    TokenSerialization(#[from] serde_json::Error),

    /// No usable token: never logged in, revoked, or refresh refused
    #[error("Session is not authorized with Spotify")]
    Unauthorized,

    /// The OAuth callback's state does not match the one issued at login
    #[error("OAuth state does not match the session")]
    InvalidState,

    /// Filesystem or socket failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether Spotify answered 401, e.g. after the user revoked access.
pub(crate) fn is_unauthorized(err: &ClientError) -> bool {
    match err {
        ClientError::Http(http) => matches!(
            http.as_ref(),
            HttpError::StatusCode(response) if response.status().as_u16() == 401
        ),
        _ => false,
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        if is_unauthorized(&err) {
            Error::Unauthorized
        } else {
            Error::SpotifyError(err)
        }
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}
