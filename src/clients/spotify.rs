use std::path::PathBuf;

use log::debug;

use crate::clients::{
    catalog::{CatalogProvider, GenreLookup, MusicCatalog},
    entities::{Artist, PlaylistSummary, Track, TrackEntry},
    errors::{Error, Result, is_unauthorized},
};
use futures::stream::TryStreamExt;
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth, Token,
    model::{
        ArtistId, FullTrack, PlayableItem, PlaylistId, PlaylistItem, SimplifiedArtist,
        SimplifiedPlaylist,
    },
    prelude::*,
    scopes,
};

impl From<SimplifiedPlaylist> for PlaylistSummary {
    fn from(p: SimplifiedPlaylist) -> PlaylistSummary {
        PlaylistSummary {
            id: p.id.id().to_string(),
            name: p.name,
        }
    }
}

impl From<FullTrack> for Track {
    fn from(t: FullTrack) -> Track {
        Track {
            id: t.id.map(|id| id.id().to_string()),
            name: t.name,
            // Local files carry artists without ids. Stop at the first one so the
            // primary artist is never replaced by a later credit.
            artists: t.artists.into_iter().map_while(artist_from).collect(),
        }
    }
}

fn artist_from(a: SimplifiedArtist) -> Option<Artist> {
    a.id.map(|id| Artist {
        id: id.id().to_string(),
        name: a.name,
    })
}

impl From<PlaylistItem> for TrackEntry {
    fn from(item: PlaylistItem) -> TrackEntry {
        match item.track {
            Some(PlayableItem::Track(track)) => TrackEntry::new(Track::from(track)),
            // Removed tracks and podcast episodes carry no artist genres
            _ => TrackEntry::unavailable(),
        }
    }
}

/// OAuth settings shared by every web session
#[derive(Clone, Debug)]
pub struct SpotifyAuth {
    creds: Credentials,
    oauth: OAuth,
}

impl SpotifyAuth {
    /// Settings from explicit credentials, mainly for tests.
    pub fn new(creds: Credentials, oauth: OAuth) -> Self {
        SpotifyAuth { creds, oauth }
    }

    /// Reads `RSPOTIFY_CLIENT_ID`, `RSPOTIFY_CLIENT_SECRET` and `RSPOTIFY_REDIRECT_URI`.
    pub fn from_env() -> Result<Self> {
        let creds = Credentials::from_env().ok_or_else(|| {
            Error::ConfigurationError(
                "Missing RSPOTIFY_CLIENT_ID or RSPOTIFY_CLIENT_SECRET in environment variables."
                    .into(),
            )
        })?;
        let oauth = OAuth::from_env(scopes!(
            "playlist-read-private",
            "playlist-read-collaborative"
        ))
        .ok_or_else(|| {
            Error::ConfigurationError(
                "Missing RSPOTIFY_REDIRECT_URI in environment variables.".into(),
            )
        })?;
        Ok(Self::new(creds, oauth))
    }

    fn client_with_state(&self, state: &str) -> AuthCodeSpotify {
        let oauth = OAuth {
            state: state.to_string(),
            ..self.oauth.clone()
        };
        AuthCodeSpotify::new(self.creds.clone(), oauth)
    }
}

impl CatalogProvider for SpotifyAuth {
    type Catalog = SpotifyClient;

    fn authorize_url(&self, state: &str) -> Result<String> {
        let url = self.client_with_state(state).get_authorize_url(false)?;
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Token> {
        let spotify = AuthCodeSpotify::new(self.creds.clone(), self.oauth.clone());
        spotify.request_token(code).await?;
        let token = spotify
            .get_token()
            .lock()
            .await
            .map_err(|_| Error::Unauthorized)?
            .clone();
        token.ok_or(Error::Unauthorized)
    }

    fn catalog_for(&self, token: Token) -> SpotifyClient {
        let spotify = AuthCodeSpotify::from_token_with_config(
            token,
            self.creds.clone(),
            self.oauth.clone(),
            Config {
                token_refreshing: true,
                ..Default::default()
            },
        );
        SpotifyClient::new(spotify)
    }

    async fn current_token(catalog: &SpotifyClient) -> Result<Option<Token>> {
        catalog.current_token().await
    }
}

/// Spotify Web API access for one user
pub struct SpotifyClient {
    /// Underlying rspotify client
    pub spotify: AuthCodeSpotify,
}

impl SpotifyClient {
    /// Wraps an already configured rspotify client.
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        SpotifyClient { spotify }
    }

    /// Token currently held by the client. It may have been refreshed during a request.
    pub async fn current_token(&self) -> Result<Option<Token>> {
        let token = self
            .spotify
            .get_token()
            .lock()
            .await
            .map_err(|_| Error::Unauthorized)?
            .clone();
        Ok(token)
    }

    /// Authorizes via CLI prompt and OAuth flow, reusing a cached token when valid.
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self.spotify.get_authorize_url(false)?;
        // This function requires the `cli` feature of rspotify.
        self.spotify.prompt_for_token(&url).await?;
        let user = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }

    /// Client configured from environment variables, caching the token on disk.
    pub fn try_default() -> Result<Self> {
        let SpotifyAuth { creds, oauth } = SpotifyAuth::from_env()?;

        let cache_path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".genrepie_token_cache");

        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            Config {
                token_cached: true,
                token_refreshing: true,
                cache_path,
                ..Default::default()
            },
        );

        Ok(Self { spotify })
    }
}

impl GenreLookup for SpotifyClient {
    async fn genres_of(&self, artist_id: &str) -> Result<Vec<String>> {
        let id = ArtistId::from_id(artist_id)?;
        let artist = self.spotify.artist(id).await.map_err(|e| {
            if is_unauthorized(&e) {
                Error::Unauthorized
            } else {
                Error::LookupFailure {
                    artist_id: artist_id.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        Ok(artist.genres)
    }
}

impl MusicCatalog for SpotifyClient {
    async fn list_user_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let stream = self.spotify.current_user_playlists();
        let playlists: Vec<PlaylistSummary> =
            stream.map_ok(PlaylistSummary::from).try_collect().await?;
        debug!("Fetched {} playlists of the current user", playlists.len());
        Ok(playlists)
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackEntry>> {
        let id = PlaylistId::from_id(playlist_id)?;
        let stream = self.spotify.playlist_items(id, None, None);
        let entries: Vec<TrackEntry> = stream.map_ok(TrackEntry::from).try_collect().await?;
        debug!("Fetched {} entries of playlist {playlist_id}", entries.len());
        Ok(entries)
    }
}
