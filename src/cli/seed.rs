use crate::{
    Res,
    recommend::{Seed, fetch_all_playlist_tracks, fetch_tracks_by_ids},
    spotify::SpotifyClient,
    types::{MAX_PLAYLIST_ITEMS_PAGE, Track},
    warning,
};

/// Where the user wants a seed to come from.
#[derive(Debug, Clone)]
pub enum SeedSource {
    Playlist(String),
    Tracks(Vec<String>),
    NowPlaying,
}

/// Tracks for an explicit id list. Unresolvable ids become empty slots.
async fn lookup_tracks(
    client: &SpotifyClient,
    ids: &[String],
    market: Option<&str>,
) -> Res<Vec<Option<Track>>> {
    let batched = fetch_tracks_by_ids(client, ids, market).await;
    if batched.all_failed() {
        let reason = batched
            .failures
            .last()
            .map(ToString::to_string)
            .unwrap_or_default();
        return Err(format!("cannot look up the given tracks: {}", reason).into());
    }
    Ok(batched.items)
}

async fn now_playing(client: &SpotifyClient, market: Option<&str>) -> Res<Option<Track>> {
    Ok(client
        .currently_playing(market)
        .await?
        .and_then(|playing| playing.item))
}

/// Builds a pipeline seed. `Ok(None)` means there is nothing to seed from.
///
/// Playlists are left for the pipeline to resolve; explicit tracks and the
/// playing track are looked up here.
pub async fn build_seed(
    client: &SpotifyClient,
    source: SeedSource,
    market: Option<&str>,
) -> Res<Option<Seed>> {
    match source {
        SeedSource::Playlist(playlist) => Ok(Some(Seed::playlist(&playlist)?)),
        SeedSource::Tracks(ids) => Ok(Some(Seed::Tracks(
            lookup_tracks(client, &ids, market).await?,
        ))),
        SeedSource::NowPlaying => match now_playing(client, market).await? {
            Some(track) => Ok(Some(Seed::Tracks(vec![Some(track)]))),
            None => {
                warning!("Nothing is playing right now.");
                Ok(None)
            }
        },
    }
}

/// Every track slot a source refers to.
pub async fn load_tracks(
    client: &SpotifyClient,
    source: SeedSource,
    market: Option<&str>,
) -> Res<Vec<Option<Track>>> {
    match source {
        SeedSource::Playlist(playlist) => {
            let tracks =
                fetch_all_playlist_tracks(client, &playlist, market, MAX_PLAYLIST_ITEMS_PAGE)
                    .await?;
            Ok(tracks)
        }
        SeedSource::Tracks(ids) => lookup_tracks(client, &ids, market).await,
        SeedSource::NowPlaying => {
            let playing = now_playing(client, market).await?;
            Ok(playing.into_iter().map(Some).collect())
        }
    }
}
