use std::collections::HashMap;
use std::sync::Mutex;

use genrepie::analyzer::{Analyzer, AnalyzerConfig};
use genrepie::clients::{
    catalog::{GenreLookup, MusicCatalog},
    entities::{Artist, PlaylistSummary, Track, TrackEntry},
    errors::{Error, Result},
};
use genrepie::genres::{TOP_GENRES, top_genres};

// Deterministic stand-in for the Spotify catalog
#[derive(Default)]
struct MockCatalog {
    playlists: Vec<PlaylistSummary>,
    tracks: HashMap<String, Vec<TrackEntry>>,
    genres: HashMap<String, Vec<String>>,
    failing_artists: Vec<String>,
    lookups: Mutex<Vec<String>>,
}

impl MockCatalog {
    fn with_artist(mut self, artist_id: &str, genres: &[&str]) -> Self {
        self.genres.insert(
            artist_id.to_string(),
            genres.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    fn with_playlist(mut self, id: &str, name: &str, entries: Vec<TrackEntry>) -> Self {
        self.playlists.push(PlaylistSummary {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.tracks.insert(id.to_string(), entries);
        self
    }

    fn failing_on(mut self, artist_id: &str) -> Self {
        self.failing_artists.push(artist_id.to_string());
        self
    }

    fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

impl GenreLookup for MockCatalog {
    async fn genres_of(&self, artist_id: &str) -> Result<Vec<String>> {
        self.lookups.lock().unwrap().push(artist_id.to_string());
        if self.failing_artists.iter().any(|a| a == artist_id) {
            return Err(Error::LookupFailure {
                artist_id: artist_id.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(self.genres.get(artist_id).cloned().unwrap_or_default())
    }
}

impl MusicCatalog for MockCatalog {
    async fn list_user_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        Ok(self.playlists.clone())
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackEntry>> {
        Ok(self.tracks.get(playlist_id).cloned().unwrap_or_default())
    }
}

// Helper function to create a track credited to the given artist ids
fn track(name: &str, artist_ids: &[&str]) -> TrackEntry {
    TrackEntry::new(Track {
        id: Some(format!("{name}_id")),
        name: name.to_string(),
        artists: artist_ids
            .iter()
            .map(|id| Artist {
                id: id.to_string(),
                name: format!("{id} name"),
            })
            .collect(),
    })
}

fn config(image_dir: &std::path::Path, memoize_artists: bool) -> AnalyzerConfig {
    AnalyzerConfig {
        image_dir: image_dir.to_path_buf(),
        memoize_artists,
    }
}

#[tokio::test]
async fn test_multiple_genres_each_count_once() {
    let catalog = MockCatalog::default().with_artist("a1", &["pop", "rock"]);
    let top = top_genres(&[track("t1", &["a1"])], &catalog).await.unwrap();

    let counts: Vec<_> = top.iter().map(|e| (e.genre.as_str(), e.count)).collect();
    assert_eq!(counts, [("pop", 1), ("rock", 1)]);
    assert_eq!(top.total(), 2);
}

#[tokio::test]
async fn test_unavailable_tracks_are_skipped() {
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop"])
        .with_artist("a2", &["rock"]);
    let with_gap = vec![
        track("t1", &["a1"]),
        TrackEntry::unavailable(),
        track("t2", &["a2"]),
    ];
    let without_gap = vec![track("t1", &["a1"]), track("t2", &["a2"])];

    let a = top_genres(&with_gap, &catalog).await.unwrap();
    let b = top_genres(&without_gap, &catalog).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_track_without_artists_is_skipped() {
    let catalog = MockCatalog::default().with_artist("a1", &["pop"]);
    let entries = vec![track("orphan", &[]), track("t1", &["a1"])];

    let top = top_genres(&entries, &catalog).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(catalog.lookup_count(), 1);
}

#[tokio::test]
async fn test_only_primary_artist_counts() {
    let catalog = MockCatalog::default()
        .with_artist("lead", &["jazz"])
        .with_artist("guest", &["hip hop"]);
    let top = top_genres(&[track("t1", &["lead", "guest"])], &catalog)
        .await
        .unwrap();

    assert_eq!(top.len(), 1);
    assert_eq!(top.entries()[0].genre, "jazz");
    assert_eq!(*catalog.lookups.lock().unwrap(), ["lead"]);
}

#[tokio::test]
async fn test_dominant_genre_ranks_first_and_table_is_truncated() {
    let mut catalog = MockCatalog::default().with_artist("pop_artist", &["pop"]);
    let mut entries = Vec::new();
    for i in 0..15 {
        let artist = format!("artist{i}");
        catalog = catalog.with_artist(&artist, &[format!("genre{i}").as_str()]);
        entries.push(track(&format!("t{i}"), &[artist.as_str()]));
    }
    for i in 0..5 {
        entries.push(track(&format!("pop{i}"), &["pop_artist"]));
    }

    let top = top_genres(&entries, &catalog).await.unwrap();
    assert_eq!(top.len(), TOP_GENRES);
    assert_eq!(top.entries()[0].genre, "pop");
    assert_eq!(top.entries()[0].count, 5);
    assert!(top.iter().skip(1).all(|e| e.count == 1));
}

#[tokio::test]
async fn test_counts_are_non_increasing_and_bounded() {
    let mut catalog = MockCatalog::default();
    let mut entries = Vec::new();
    // artist i carries genres g0..=g(i % 13), so lower genres are more frequent
    for i in 0..40 {
        let artist = format!("artist{i}");
        let genres: Vec<String> = (0..=(i % 13)).map(|g| format!("g{g}")).collect();
        let genres: Vec<&str> = genres.iter().map(String::as_str).collect();
        catalog = catalog.with_artist(&artist, &genres);
        entries.push(track(&format!("t{i}"), &[artist.as_str()]));
    }

    let top = top_genres(&entries, &catalog).await.unwrap();
    assert!(top.len() <= TOP_GENRES);
    let counts: Vec<u32> = top.iter().map(|e| e.count).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(top.entries()[0].genre, "g0");
    assert_eq!(top.entries()[0].count, 40);
}

#[tokio::test]
async fn test_aggregation_is_idempotent() {
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop", "dance pop"])
        .with_artist("a2", &["rock", "pop"])
        .with_artist("a3", &["rock"]);
    let entries = vec![
        track("t1", &["a1"]),
        track("t2", &["a2"]),
        TrackEntry::unavailable(),
        track("t3", &["a3"]),
    ];

    let first = top_genres(&entries, &catalog).await.unwrap();
    let second = top_genres(&entries, &catalog).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_empty_track_list_gives_empty_result() {
    let catalog = MockCatalog::default();
    let top = top_genres(&[], &catalog).await.unwrap();
    assert!(top.is_empty());
    assert_eq!(catalog.lookup_count(), 0);
}

#[tokio::test]
async fn test_lookup_failure_fails_whole_aggregation() {
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop"])
        .failing_on("broken");
    let entries = vec![track("t1", &["a1"]), track("t2", &["broken"]), track("t3", &["a1"])];

    let err = top_genres(&entries, &catalog).await.unwrap_err();
    assert!(matches!(err, Error::LookupFailure { ref artist_id, .. } if artist_id == "broken"));
    // no retries, and nothing after the failure is looked up
    assert_eq!(catalog.lookup_count(), 2);
}

#[tokio::test]
async fn test_repeated_artist_is_looked_up_per_track_without_memoization() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop"])
        .with_playlist("p1", "Roadtrip", vec![track("t1", &["a1"]), track("t2", &["a1"])]);

    let config = config(tmp.path(), false);
    let (_, top) = Analyzer::new(&catalog, &config)
        .top_genres("Roadtrip")
        .await
        .unwrap();
    assert_eq!(top.entries()[0].count, 2);
    assert_eq!(catalog.lookup_count(), 2);
}

#[tokio::test]
async fn test_memoization_does_not_change_counts() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop", "rock"])
        .with_artist("a2", &["rock"])
        .with_playlist(
            "p1",
            "Roadtrip",
            vec![track("t1", &["a1"]), track("t2", &["a1"]), track("t3", &["a2"])],
        );

    let plain = config(tmp.path(), false);
    let (_, expected) = Analyzer::new(&catalog, &plain)
        .top_genres("Roadtrip")
        .await
        .unwrap();
    catalog.lookups.lock().unwrap().clear();

    let memoized = config(tmp.path(), true);
    let (_, top) = Analyzer::new(&catalog, &memoized)
        .top_genres("Roadtrip")
        .await
        .unwrap();
    assert_eq!(top, expected);
    assert_eq!(catalog.lookup_count(), 2);
    assert_eq!(top.entries()[0].genre, "rock");
    assert_eq!(top.entries()[0].count, 3);
}

#[tokio::test]
async fn test_playlist_name_is_case_insensitive() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop"])
        .with_playlist("p1", "Roadtrip", vec![track("t1", &["a1"])]);

    let config = config(tmp.path(), true);
    let (name, top) = Analyzer::new(&catalog, &config)
        .top_genres("roadtrip")
        .await
        .unwrap();
    assert_eq!(name, "Roadtrip");
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn test_unknown_playlist_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = MockCatalog::default().with_playlist("p1", "Roadtrip", vec![]);

    let config = config(tmp.path(), true);
    let err = Analyzer::new(&catalog, &config)
        .analyze("Workout")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PlaylistNotFound(ref name) if name == "Workout"));
    assert_eq!(err.to_string(), "Workout does not exist. Please try again.");
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_analyze_saves_chart() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = MockCatalog::default()
        .with_artist("a1", &["pop", "rock"])
        .with_playlist("p1", "Roadtrip", vec![track("t1", &["a1"])]);

    let config = config(&tmp.path().join("images"), true);
    let analysis = Analyzer::new(&catalog, &config)
        .analyze("ROADTRIP")
        .await
        .unwrap();

    assert_eq!(analysis.playlist_name, "Roadtrip");
    assert_eq!(analysis.top.len(), 2);
    let svg = std::fs::read_to_string(tmp.path().join("images").join(&analysis.image_file)).unwrap();
    assert!(svg.contains("Top Genres in Roadtrip"));
}

#[tokio::test]
async fn test_analyze_playlist_without_genres_still_renders() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = MockCatalog::default().with_playlist(
        "p1",
        "Ambient",
        vec![TrackEntry::unavailable(), track("t1", &["unknown"])],
    );

    let config = config(tmp.path(), true);
    let analysis = Analyzer::new(&catalog, &config)
        .analyze("Ambient")
        .await
        .unwrap();
    assert!(analysis.top.is_empty());
    let svg = std::fs::read_to_string(tmp.path().join(&analysis.image_file)).unwrap();
    assert!(svg.contains("No genres found"));
}
