//! Seed → albums → album tracks → enriched, ranked candidate pool.
//!
//! A run resolves the seed into tracks, collects the distinct albums those
//! tracks belong to and then, one album at a time, lists the album, fetches
//! full records for its tracks and ranks them by popularity. Each album's
//! ranked tracks are appended to the pool as a block, so the pool reads album
//! by album in the order the albums were first met in the seed. There is no
//! ranking across albums.
//!
//! Failures below the seed only cost the album they happen in. A failing seed
//! ends the run, and so does a run in which every album failed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    error::{CatalogError, PipelineError},
    recommend::{
        catalog::{Catalog, fetch_all_album_tracks, fetch_all_playlist_tracks, fetch_tracks_by_ids},
        extract::{compact_owned, extract_albums, unique_albums},
        rank::rank_by_popularity,
    },
    types::{Album, MAX_ALBUM_TRACKS_PAGE, MAX_PLAYLIST_ITEMS_PAGE, Track},
    utils,
};

/// Where a run starts from.
#[derive(Debug, Clone)]
pub enum Seed {
    /// A playlist id; its items are fetched when the run starts.
    Playlist(String),
    /// A caller-supplied collection, used as is. Empty slots are allowed.
    Tracks(Vec<Option<Track>>),
}

/// Loosely shaped seed input as it arrives over HTTP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedRequest {
    /// Playlist id, `spotify:playlist:` URI or open.spotify.com URL.
    #[serde(default)]
    pub playlist: Option<String>,
    /// Pre-fetched track collection.
    #[serde(default)]
    pub tracks: Option<Vec<Option<Track>>>,
}

impl Seed {
    /// Validates a request. Rejection happens here, before anything touches the network.
    ///
    /// Exactly one of `playlist` and `tracks` must be set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedSeed`] when both or neither are set, or
    /// when the playlist reference cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// let request: SeedRequest = serde_json::from_str(r#"{"playlist": "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"}"#)?;
    /// let seed = Seed::from_request(request)?;
    /// ```
    pub fn from_request(request: SeedRequest) -> Result<Self, PipelineError> {
        match (request.playlist, request.tracks) {
            (Some(_), Some(_)) => Err(PipelineError::MalformedSeed(
                "expected either a playlist or a track collection, got both".to_string(),
            )),
            (None, None) => Err(PipelineError::MalformedSeed(
                "expected a playlist or a track collection".to_string(),
            )),
            (Some(playlist), None) => Self::playlist(&playlist),
            (None, Some(tracks)) => Ok(Seed::Tracks(tracks)),
        }
    }

    /// Playlist seed from an id, URI or URL.
    pub fn playlist(reference: &str) -> Result<Self, PipelineError> {
        utils::parse_spotify_id(reference, "playlist")
            .map(Seed::Playlist)
            .ok_or_else(|| {
                PipelineError::MalformedSeed(format!("'{}' is not a playlist reference", reference))
            })
    }
}

/// Position of a run.
///
/// A run moves `Idle → SourcingSeed → ExpandingAlbums`, then through
/// `FetchingAlbumTracks → EnrichingTracks → Ranking` once per album, and ends
/// in `Done`. `album` is the zero-based index into the `albums` distinct albums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SourcingSeed,
    ExpandingAlbums,
    FetchingAlbumTracks { album: usize, albums: usize },
    EnrichingTracks { album: usize, albums: usize },
    Ranking { album: usize, albums: usize },
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::SourcingSeed => write!(f, "Resolving seed..."),
            Phase::ExpandingAlbums => write!(f, "Collecting albums..."),
            Phase::FetchingAlbumTracks { album, albums } => {
                write!(f, "Listing album {}/{}...", album + 1, albums)
            }
            Phase::EnrichingTracks { album, albums } => {
                write!(f, "Fetching tracks of album {}/{}...", album + 1, albums)
            }
            Phase::Ranking { album, albums } => {
                write!(f, "Ranking album {}/{}...", album + 1, albums)
            }
            Phase::Done => write!(f, "Done"),
        }
    }
}

/// Tuning for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// ISO market passed to every catalog call; `None` lets the catalog decide.
    pub market: Option<String>,
    /// Page size for album listings (at most 50).
    pub album_page_limit: u32,
    /// Page size for playlist listings (at most 100).
    pub playlist_page_limit: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            market: None,
            album_page_limit: MAX_ALBUM_TRACKS_PAGE,
            playlist_page_limit: MAX_PLAYLIST_ITEMS_PAGE,
        }
    }
}

/// The ranked tracks one album added to the pool.
#[derive(Debug, Clone)]
pub struct AlbumContribution {
    pub album: Album,
    pub tracks: Vec<Track>,
}

/// An album that contributed nothing, with the reason.
#[derive(Debug)]
pub struct SkippedAlbum {
    pub album: Album,
    pub error: CatalogError,
}

/// Result of a finished run.
#[derive(Debug, Default)]
pub struct CandidatePool {
    /// Per-album ranked tracks, concatenated in album encounter order.
    pub combined_tracks: Vec<Track>,
    /// The same tracks grouped by the album that contributed them.
    pub albums: Vec<AlbumContribution>,
    /// Albums that contributed nothing, in encounter order.
    pub skipped: Vec<SkippedAlbum>,
    /// Track batches that failed, including those of skipped albums.
    pub failed_batches: usize,
}

impl CandidatePool {
    /// The most recent non-fatal error, if any album was skipped.
    pub fn last_error(&self) -> Option<&CatalogError> {
        self.skipped.last().map(|s| &s.error)
    }
}

type PhaseObserver<'a> = Box<dyn FnMut(&Phase) + Send + 'a>;

/// Drives one run at a time against a [`Catalog`].
pub struct RecommendationAggregator<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    options: PipelineOptions,
    phase: Phase,
    observer: Option<PhaseObserver<'a>>,
}

impl<'a, C: Catalog + ?Sized> RecommendationAggregator<'a, C> {
    /// Creates an idle aggregator reading from `catalog`.
    ///
    /// # Example
    ///
    /// ```
    /// let mut aggregator = RecommendationAggregator::new(&client, PipelineOptions::default())
    ///     .with_observer(|phase| spinner.set_message(phase.to_string()));
    /// let pool = aggregator.run(Seed::playlist("37i9dQZF1DXcBWIGoYBM5M")?).await?;
    /// ```
    pub fn new(catalog: &'a C, options: PipelineOptions) -> Self {
        Self {
            catalog,
            options,
            phase: Phase::Idle,
            observer: None,
        }
    }

    /// Calls `observer` on every phase transition.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&Phase) + Send + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current phase; `Done` after a run, whatever its outcome.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    fn enter(&mut self, phase: Phase) {
        debug!(%phase, "pipeline phase");
        self.phase = phase;
        if let Some(observer) = self.observer.as_mut() {
            observer(&phase);
        }
    }

    /// Runs the pipeline for `seed` and returns the finished pool.
    ///
    /// Albums are processed strictly one after another. Every call starts from
    /// an empty pool.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::SeedResolution`] - the seed playlist could not be listed
    /// - [`PipelineError::AllAlbumsFailed`] - albums were attempted and every one
    ///   was skipped
    ///
    /// A seed without any album yields an empty pool, not an error.
    pub async fn run(&mut self, seed: Seed) -> Result<CandidatePool, PipelineError> {
        self.phase = Phase::Idle;
        self.enter(Phase::SourcingSeed);

        let market = self.options.market.clone();
        let seed_tracks = match seed {
            Seed::Playlist(playlist_id) => match fetch_all_playlist_tracks(
                self.catalog,
                &playlist_id,
                market.as_deref(),
                self.options.playlist_page_limit,
            )
            .await
            {
                Ok(tracks) => tracks,
                Err(e) => {
                    error!(%playlist_id, "cannot resolve seed playlist: {}", e);
                    self.enter(Phase::Done);
                    return Err(PipelineError::SeedResolution(e));
                }
            },
            Seed::Tracks(tracks) => tracks,
        };

        self.enter(Phase::ExpandingAlbums);
        let albums = unique_albums(extract_albums(&seed_tracks));
        let total = albums.len();
        debug!(seed_tracks = seed_tracks.len(), albums = total, "expanded seed");

        let mut pool = CandidatePool::default();
        for (index, album) in albums.into_iter().enumerate() {
            self.enter(Phase::FetchingAlbumTracks {
                album: index,
                albums: total,
            });
            let listing = match fetch_all_album_tracks(
                self.catalog,
                &album.id,
                market.as_deref(),
                self.options.album_page_limit,
            )
            .await
            {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(album_id = %album.id, "skipping album, listing failed: {}", e);
                    pool.skipped.push(SkippedAlbum { album, error: e });
                    continue;
                }
            };

            self.enter(Phase::EnrichingTracks {
                album: index,
                albums: total,
            });
            let ids: Vec<String> = listing
                .into_iter()
                .map(|t| t.id)
                .filter(|id| !id.is_empty())
                .collect();
            let mut enriched = fetch_tracks_by_ids(self.catalog, &ids, market.as_deref()).await;
            pool.failed_batches += enriched.failures.len();
            if enriched.all_failed() {
                if let Some(e) = enriched.failures.pop() {
                    warn!(album_id = %album.id, "skipping album, no track batch succeeded: {}", e);
                    pool.skipped.push(SkippedAlbum { album, error: e });
                }
                continue;
            }

            self.enter(Phase::Ranking {
                album: index,
                albums: total,
            });
            let ranked = rank_by_popularity(&compact_owned(enriched.items));
            pool.combined_tracks.extend(ranked.iter().cloned());
            pool.albums.push(AlbumContribution {
                album,
                tracks: ranked,
            });
        }

        self.enter(Phase::Done);

        if total > 0 && pool.albums.is_empty() {
            if let Some(last) = pool.skipped.pop() {
                return Err(PipelineError::AllAlbumsFailed {
                    albums: total,
                    last: last.error,
                });
            }
        }

        info!(
            albums = pool.albums.len(),
            skipped = pool.skipped.len(),
            tracks = pool.combined_tracks.len(),
            "candidate pool ready"
        );
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_needs_exactly_one_seed_kind() {
        assert!(matches!(
            Seed::from_request(SeedRequest::default()),
            Err(PipelineError::MalformedSeed(_))
        ));

        let both = SeedRequest {
            playlist: Some("37i9dQZF1DXcBWIGoYBM5M".to_string()),
            tracks: Some(vec![]),
        };
        assert!(matches!(
            Seed::from_request(both),
            Err(PipelineError::MalformedSeed(_))
        ));
    }

    #[test]
    fn request_accepts_playlist_uri() {
        let request = SeedRequest {
            playlist: Some("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M".to_string()),
            tracks: None,
        };
        match Seed::from_request(request) {
            Ok(Seed::Playlist(id)) => assert_eq!(id, "37i9dQZF1DXcBWIGoYBM5M"),
            other => panic!("unexpected seed: {:?}", other),
        }
    }

    #[test]
    fn request_rejects_garbage_playlist() {
        let request = SeedRequest {
            playlist: Some("not a playlist!".to_string()),
            tracks: None,
        };
        assert!(matches!(
            Seed::from_request(request),
            Err(PipelineError::MalformedSeed(_))
        ));
    }

    #[test]
    fn request_accepts_track_collection_with_empty_slots() {
        let request: SeedRequest =
            serde_json::from_str(r#"{"tracks": [null, {"id": "t1", "name": "Song"}]}"#).unwrap();
        match Seed::from_request(request) {
            Ok(Seed::Tracks(tracks)) => {
                assert_eq!(tracks.len(), 2);
                assert!(tracks[0].is_none());
            }
            other => panic!("unexpected seed: {:?}", other),
        }
    }

    #[test]
    fn phase_messages_are_one_based() {
        let phase = Phase::FetchingAlbumTracks {
            album: 0,
            albums: 3,
        };
        assert_eq!(phase.to_string(), "Listing album 1/3...");
    }
}
