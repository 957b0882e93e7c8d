//! # Recommendation Module
//!
//! Turns a seed (a playlist or a pre-fetched track collection) into a pool of
//! candidate tracks: every album the seed touches is listed, its tracks are
//! resolved to full records and ranked by popularity within the album.
//!
//! - [`extract`] - pure projections from tracks to albums and artists
//! - [`rank`] - stable popularity ordering
//! - [`frequency`] - primary-artist counting and top-N selection
//! - [`catalog`] - the [`Catalog`] boundary with paging and batching helpers
//! - [`pipeline`] - the [`RecommendationAggregator`] that drives a run
//!
//! Only [`catalog`] and [`pipeline`] perform I/O, and only through a [`Catalog`].

pub mod catalog;
pub mod extract;
pub mod frequency;
pub mod pipeline;
pub mod rank;

pub use catalog::{
    Batched, Catalog, fetch_all_album_tracks, fetch_all_playlist_tracks, fetch_artists_by_ids,
    fetch_tracks_by_ids,
};
pub use extract::{compact, compact_owned, extract_albums, extract_primary_artist_groups, unique_albums};
pub use frequency::{ArtistCount, FrequencyMap, count_primary_artists, top_artists};
pub use pipeline::{
    AlbumContribution, CandidatePool, Phase, PipelineOptions, RecommendationAggregator, Seed,
    SeedRequest, SkippedAlbum,
};
pub use rank::rank_by_popularity;
