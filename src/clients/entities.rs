/// A credited artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    /// Catalog id, the key of genre lookups
    pub id: String,
    /// Display name
    pub name: String,
}

/// A playable track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Catalog id, absent for local files
    pub id: Option<String>,
    /// Track title
    pub name: String,
    /// Credited artists in catalog order
    pub artists: Vec<Artist>,
}

impl Track {
    /// First credited artist, the one whose genres the track counts for.
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }
}

/// A playlist slot. `track` is `None` when the source track was removed or is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEntry {
    /// The track, if still available
    pub track: Option<Track>,
}

impl TrackEntry {
    /// Entry holding an available track.
    pub fn new(track: Track) -> Self {
        TrackEntry { track: Some(track) }
    }

    /// Entry whose track is gone.
    pub fn unavailable() -> Self {
        TrackEntry { track: None }
    }
}

/// A playlist of the user, without its tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    /// Catalog id
    pub id: String,
    /// Display name
    pub name: String,
}
