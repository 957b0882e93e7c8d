use crate::{
    recommend::{AlbumContribution, ArtistCount},
    types::{Artist, ArtistTableRow, TrackTableRow},
};

/// Extracts a catalog id of `kind` from a bare id, a `spotify:<kind>:<id>` URI
/// or an `https://open.spotify.com/.../<kind>/<id>` URL.
///
/// Returns `None` if the input names a different kind of entity or the id is
/// not base62.
///
/// # Arguments
///
/// * `input` - User-supplied reference; surrounding whitespace is ignored
/// * `kind` - Expected entity kind such as `track` or `playlist`
///
/// # Example
///
/// ```
/// use spotseed::utils::parse_spotify_id;
///
/// let id = parse_spotify_id("https://open.spotify.com/intl-de/track/4uLU6hMCjMI75M1A2tKUQC", "track");
/// assert_eq!(id.as_deref(), Some("4uLU6hMCjMI75M1A2tKUQC"));
/// assert_eq!(parse_spotify_id("spotify:album:4uLU6hMCjMI75M1A2tKUQC", "track"), None);
/// ```
pub fn parse_spotify_id(input: &str, kind: &str) -> Option<String> {
    let input = input.trim();

    let candidate = if let Some(rest) = input.strip_prefix("spotify:") {
        let (found_kind, id) = rest.split_once(':')?;
        if found_kind != kind {
            return None;
        }
        id
    } else if input.starts_with("https://") || input.starts_with("http://") {
        let path = input.split(['?', '#']).next().unwrap_or_default();
        let mut segments = path.trim_end_matches('/').rsplit('/');
        let id = segments.next()?;
        if segments.next()? != kind {
            return None;
        }
        id
    } else {
        input
    };

    if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Parses one track id, URI or URL.
///
/// Used as a clap value parser, hence the `String` error.
pub fn parse_track_ref(input: &str) -> Result<String, String> {
    if input.trim().is_empty() {
        return Err("track reference cannot be empty".to_string());
    }
    parse_spotify_id(input, "track").ok_or_else(|| format!("invalid track reference '{}'", input))
}

/// Parses a playlist id, URI or URL for clap.
pub fn parse_playlist_ref(input: &str) -> Result<String, String> {
    parse_spotify_id(input, "playlist")
        .ok_or_else(|| format!("invalid playlist reference '{}'", input))
}

/// Parses a two-letter market code for clap.
pub fn parse_market_arg(input: &str) -> Result<String, String> {
    crate::config::parse_market(input)
        .ok_or_else(|| format!("invalid market '{}', expected a two-letter country code", input))
}

pub fn format_popularity(popularity: Option<u32>) -> String {
    popularity.map_or_else(|| "-".to_string(), |p| p.to_string())
}

pub fn format_genres(artist: &Artist, max: usize) -> String {
    artist
        .genres
        .iter()
        .take(max)
        .cloned()
        .collect::<Vec<_>>()
        .join(",")
}

/// One row per pooled track, numbered within its album.
pub fn track_table_rows(albums: &[AlbumContribution]) -> Vec<TrackTableRow> {
    albums
        .iter()
        .flat_map(|contribution| {
            contribution
                .tracks
                .iter()
                .enumerate()
                .map(|(i, track)| TrackTableRow {
                    album: contribution.album.name.clone(),
                    position: i + 1,
                    name: track.name.clone(),
                    artists: track.artists_string(", "),
                    popularity: format_popularity(track.popularity),
                    duration: track.duration_formatted(),
                })
        })
        .collect()
}

/// Ranked artist rows; `details` supplies full records by position when available.
pub fn artist_table_rows(
    counts: &[ArtistCount],
    details: Option<&[Option<Artist>]>,
) -> Vec<ArtistTableRow> {
    counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let artist = details
                .and_then(|d| d.get(i))
                .and_then(Option::as_ref)
                .unwrap_or(&count.artist);
            ArtistTableRow {
                rank: i + 1,
                name: artist.name.clone(),
                tracks: count.count,
                popularity: format_popularity(artist.popularity),
                genres: format_genres(artist, 3),
            }
        })
        .collect()
}
