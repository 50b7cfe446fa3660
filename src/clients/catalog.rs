use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, PoisonError},
};

use log::debug;
use rspotify::Token;

use crate::clients::{
    entities::{PlaylistSummary, TrackEntry},
    errors::Result,
};

/// Resolves an artist id to the genre labels the catalog attaches to it.
pub trait GenreLookup: Sync {
    /// Genre labels of the artist, in catalog order. May be empty.
    fn genres_of(&self, artist_id: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Playlist access for the authenticated user.
pub trait MusicCatalog: GenreLookup {
    /// Every playlist the user owns or follows.
    fn list_user_playlists(&self) -> impl Future<Output = Result<Vec<PlaylistSummary>>> + Send;

    /// Entries of a playlist in playlist order, unavailable tracks included.
    fn playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> impl Future<Output = Result<Vec<TrackEntry>>> + Send;
}

/// Remembers `artist id -> genres` answers for the lifetime of one request.
///
/// Failed lookups are not cached, so the error still reaches the caller.
pub struct MemoizedLookup<'a, L: ?Sized> {
    inner: &'a L,
    cache: Mutex<HashMap<String, Vec<String>>>,
}

impl<'a, L: GenreLookup + ?Sized> MemoizedLookup<'a, L> {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: &'a L) -> Self {
        MemoizedLookup {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct artists looked up so far.
    pub fn cached_artists(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<L: GenreLookup + ?Sized> GenreLookup for MemoizedLookup<'_, L> {
    async fn genres_of(&self, artist_id: &str) -> Result<Vec<String>> {
        let cached = {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.get(artist_id).cloned()
        };
        if let Some(genres) = cached {
            debug!("Reusing genres of artist {artist_id}");
            return Ok(genres);
        }

        let genres = self.inner.genres_of(artist_id).await?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(artist_id.to_string(), genres.clone());
        Ok(genres)
    }
}

/// Authorization against the catalog service and per-user catalog access.
///
/// The web app holds one provider and builds a fresh catalog per request from
/// the session's stored token.
pub trait CatalogProvider: Send + Sync + 'static {
    /// Catalog bound to one user's token
    type Catalog: MusicCatalog + Send;

    /// URL the user is sent to for consent. `state` comes back on the callback.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Trades the callback's authorization code for a token.
    fn exchange_code(&self, code: &str) -> impl Future<Output = Result<Token>> + Send;

    /// Catalog acting on behalf of the token's owner.
    fn catalog_for(&self, token: Token) -> Self::Catalog;

    /// Token the catalog currently holds, which may have been refreshed.
    fn current_token(
        catalog: &Self::Catalog,
    ) -> impl Future<Output = Result<Option<Token>>> + Send;
}
