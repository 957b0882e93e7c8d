use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::error;

use crate::{
    error::PipelineError,
    recommend::{Catalog, CandidatePool, PipelineOptions, RecommendationAggregator, Seed},
    types::Track,
};

/// What observers see of the most recent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Candidate pool of the last finished run; empty while loading or after a failure.
    pub combined_tracks: Vec<Track>,
    /// `true` between [`RunStateManager::begin`] and the matching finish.
    pub loading: bool,
    /// Fatal error of a failed run, or the last skipped album's error of a finished one.
    pub error: Option<String>,
    /// Names of the albums the last run skipped.
    pub skipped_albums: Vec<String>,
}

/// Shared, observable state of pipeline runs.
///
/// Cloning is cheap and every clone sees the same state.
#[derive(Debug, Clone, Default)]
pub struct RunStateManager {
    state: Arc<Mutex<RunState>>,
}

impl RunStateManager {
    /// Creates a manager with no run recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the whole state as it stands.
    pub async fn snapshot(&self) -> RunState {
        self.state.lock().await.clone()
    }

    /// Copy of the candidate pool of the last finished run.
    pub async fn combined_tracks(&self) -> Vec<Track> {
        self.state.lock().await.combined_tracks.clone()
    }

    /// Whether a run is in progress.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Marks a run as started and drops the previous result.
    ///
    /// Returns `false`, leaving the state untouched, while another run is loading.
    pub async fn begin(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.loading {
            return false;
        }
        *state = RunState {
            loading: true,
            ..Default::default()
        };
        true
    }

    /// Publishes the outcome of the run started by [`begin`](Self::begin).
    pub async fn finish(&self, result: Result<CandidatePool, PipelineError>) {
        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(pool) => {
                state.error = pool.last_error().map(ToString::to_string);
                state.skipped_albums = pool
                    .skipped
                    .iter()
                    .map(|s| s.album.name.clone())
                    .collect();
                state.combined_tracks = pool.combined_tracks;
            }
            Err(e) => {
                state.combined_tracks.clear();
                state.skipped_albums.clear();
                state.error = Some(e.to_string());
            }
        }
    }

    /// Runs the pipeline for `seed` and publishes its result.
    ///
    /// The caller must have won [`begin`](Self::begin) first.
    pub async fn execute<C>(&self, catalog: &C, options: PipelineOptions, seed: Seed)
    where
        C: Catalog + ?Sized,
    {
        let result = RecommendationAggregator::new(catalog, options)
            .run(seed)
            .await;
        self.finish(result).await;
    }

    /// Runs the pipeline for `seed` on a background task.
    ///
    /// The run is driven by a worker task that a supervising task awaits. When
    /// the worker panics or is cancelled, the supervisor publishes
    /// [`PipelineError::Aborted`], so `loading` never stays set and later runs
    /// can start.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog the run reads from
    /// * `options` - Market and page size for the run
    /// * `seed` - Validated seed
    ///
    /// # Returns
    ///
    /// Handle of the supervising task. It completes once the state is published.
    ///
    /// # Example
    ///
    /// ```
    /// if runs.begin().await {
    ///     runs.spawn(Arc::clone(&catalog), PipelineOptions::default(), seed);
    /// }
    /// ```
    pub fn spawn(
        &self,
        catalog: Arc<dyn Catalog>,
        options: PipelineOptions,
        seed: Seed,
    ) -> JoinHandle<()> {
        let runs = self.clone();
        tokio::spawn(async move {
            let worker_runs = runs.clone();
            let worker = tokio::spawn(async move {
                worker_runs.execute(catalog.as_ref(), options, seed).await;
            });
            if let Err(e) = worker.await {
                error!(error = %e, "recommendation run aborted");
                runs.finish(Err(PipelineError::Aborted(e.to_string()))).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{CatalogError, CatalogResult},
        recommend::{AlbumContribution, SkippedAlbum},
        types::{
            Album, AlbumTrackPage, AlbumTracksOptions, Artist, Page, PlaylistItem,
            PlaylistItemsOptions,
        },
    };
    use async_trait::async_trait;

    // Panics as soon as the run asks for an album listing.
    struct PanickingCatalog;

    #[async_trait]
    impl Catalog for PanickingCatalog {
        async fn playlist_items(
            &self,
            _playlist_id: &str,
            _options: &PlaylistItemsOptions,
        ) -> CatalogResult<Page<PlaylistItem>> {
            Ok(Page::complete(Vec::new()))
        }

        async fn album_tracks(
            &self,
            _album_id: &str,
            _options: &AlbumTracksOptions,
        ) -> CatalogResult<AlbumTrackPage> {
            panic!("catalog blew up");
        }

        async fn several_tracks(
            &self,
            _ids: &[String],
            _market: Option<&str>,
        ) -> CatalogResult<Vec<Option<Track>>> {
            Ok(Vec::new())
        }

        async fn several_artists(&self, _ids: &[String]) -> CatalogResult<Vec<Option<Artist>>> {
            Ok(Vec::new())
        }
    }

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: id.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn begin_clears_previous_result_and_blocks_overlap() {
        let manager = RunStateManager::new();
        assert!(manager.begin().await);
        manager
            .finish(Ok(CandidatePool {
                combined_tracks: vec![track("t1")],
                ..Default::default()
            }))
            .await;
        assert_eq!(manager.combined_tracks().await.len(), 1);

        assert!(manager.begin().await);
        let state = manager.snapshot().await;
        assert!(state.loading);
        assert!(state.combined_tracks.is_empty());
        assert!(state.error.is_none());

        assert!(!manager.begin().await);
    }

    #[tokio::test]
    async fn finished_run_reports_skipped_albums() {
        let manager = RunStateManager::new();
        manager.begin().await;

        let album = |id: &str, name: &str| Album {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        };
        let pool = CandidatePool {
            combined_tracks: vec![track("t1"), track("t2")],
            albums: vec![AlbumContribution {
                album: album("a", "Kept"),
                tracks: vec![track("t1"), track("t2")],
            }],
            skipped: vec![SkippedAlbum {
                album: album("b", "Broken"),
                error: CatalogError::Status {
                    status: 404,
                    message: "Non existing id".to_string(),
                },
            }],
            failed_batches: 0,
        };
        manager.finish(Ok(pool)).await;

        let state = manager.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.combined_tracks.len(), 2);
        assert_eq!(state.skipped_albums, vec!["Broken"]);
        assert!(state.error.unwrap().contains("404"));
    }

    #[tokio::test]
    async fn failed_run_keeps_no_tracks() {
        let manager = RunStateManager::new();
        manager.begin().await;
        manager
            .finish(Err(PipelineError::MalformedSeed("empty".to_string())))
            .await;

        let state = manager.snapshot().await;
        assert!(!state.loading);
        assert!(state.combined_tracks.is_empty());
        assert_eq!(state.error.as_deref(), Some("malformed seed: empty"));
    }

    #[tokio::test]
    async fn panicking_run_releases_loading() {
        let manager = RunStateManager::new();
        assert!(manager.begin().await);

        let seed = Seed::Tracks(vec![Some(Track {
            album: Album {
                id: "alb".to_string(),
                name: "Album".to_string(),
                ..Default::default()
            },
            ..track("s1")
        })]);
        manager
            .spawn(Arc::new(PanickingCatalog), PipelineOptions::default(), seed)
            .await
            .unwrap();

        let state = manager.snapshot().await;
        assert!(!state.loading);
        assert!(state.combined_tracks.is_empty());
        assert!(state.error.unwrap().starts_with("run aborted"));

        // the next run is not refused
        assert!(manager.begin().await);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let manager = RunStateManager::new();
        let other = manager.clone();
        manager.begin().await;
        assert!(other.is_loading().await);
    }
}
