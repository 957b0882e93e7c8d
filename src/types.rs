use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// Maximum number of identifiers the catalog accepts on batched lookups.
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// Maximum page size for album track listings.
pub const MAX_ALBUM_TRACKS_PAGE: u32 = 50;

/// Maximum page size for playlist item listings.
pub const MAX_PLAYLIST_ITEMS_PAGE: u32 = 100;

/// Seconds before expiry at which a bearer token is renewed.
pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 240;

/// Bearer token as returned by the token endpoint.
///
/// `obtained_at` is not part of the response; it is stamped with the unix time
/// the token was received so expiry can be checked later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    #[serde(default)]
    pub obtained_at: u64,
}

impl Token {
    /// `true` once `now` (unix seconds) is within the refresh margin of expiry.
    pub fn is_stale_at(&self, now: u64) -> bool {
        now + TOKEN_REFRESH_MARGIN_SECS >= self.obtained_at + self.expires_in
    }
}

// Local files carry `null` ids in catalog responses.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Empty for artists of local files.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    pub name: String,
    /// Only present on full artist records.
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub total_tracks: u32,
}

/// A full track record as returned by the catalog.
///
/// `popularity` stays `None` when the catalog did not report one; nothing in
/// this crate rewrites it to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Album,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub uri: String,
}

impl Track {
    /// First listed artist, the one frequency analysis counts.
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }

    pub fn artists_string(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Duration formatted as MM:SS.
    pub fn duration_formatted(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// Track entry of an album listing. Carries no popularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumTrack {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// Single page holding every item.
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as u32;
        Self {
            items,
            total,
            offset: 0,
            limit: total,
            next: None,
        }
    }

    /// Whether items remain past this page, given the offset it was requested at.
    ///
    /// The requested offset is used rather than the `offset` field, which some
    /// responses omit or report as zero.
    ///
    /// # Arguments
    ///
    /// * `requested_offset` - Offset sent with the request that produced this page
    ///
    /// # Example
    ///
    /// ```
    /// let page = catalog.album_tracks(album_id, &options).await?;
    /// if page.has_more_after(options.offset.unwrap_or(0)) {
    ///     // request the next page
    /// }
    /// ```
    pub fn has_more_after(&self, requested_offset: u32) -> bool {
        !self.items.is_empty() && requested_offset + (self.items.len() as u32) < self.total
    }
}

pub type AlbumTrackPage = Page<AlbumTrack>;

/// Playlist entry; the track slot is empty when the catalog cannot resolve it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

/// Query options for playlist item listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItemsOptions {
    /// ISO 3166-1 alpha-2 market; tracks are relinked to versions playable there.
    pub market: Option<String>,
    /// Page size, capped at 100 by the catalog.
    pub limit: Option<u32>,
    /// Index of the first item to return.
    pub offset: Option<u32>,
}

impl PlaylistItemsOptions {
    /// Query pairs for the request; unset fields are left out.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        // episodes come back as track objects instead of failing to decode
        let mut query = vec![("additional_types", "track".to_string())];
        push_common_query(&mut query, &self.market, self.limit, self.offset);
        query
    }
}

/// Query options for album track listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumTracksOptions {
    /// ISO 3166-1 alpha-2 market; unavailable tracks are dropped by the catalog.
    pub market: Option<String>,
    /// Page size, capped at 50 by the catalog.
    pub limit: Option<u32>,
    /// Index of the first track to return.
    pub offset: Option<u32>,
}

impl AlbumTracksOptions {
    /// Query pairs for the request; unset fields are left out.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_common_query(&mut query, &self.market, self.limit, self.offset);
        query
    }
}

fn push_common_query(
    query: &mut Vec<(&'static str, String)>,
    market: &Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
) {
    if let Some(market) = market {
        query.push(("market", market.clone()));
    }
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(offset) = offset {
        query.push(("offset", offset.to_string()));
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub album: String,
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artists: String,
    pub popularity: String,
    pub duration: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    pub tracks: usize,
    pub popularity: String,
    pub genres: String,
}
