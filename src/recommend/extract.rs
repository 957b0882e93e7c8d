//! Pure projections from a track collection to the albums and artists it references.

use std::collections::HashSet;

use crate::types::{Album, Artist, Track};

/// Drops empty slots from a track collection, preserving the order of the rest.
///
/// Every other function in this module skips empty slots on its own; `compact`
/// is the single place where a collection is turned into plain tracks.
pub fn compact(tracks: &[Option<Track>]) -> Vec<Track> {
    tracks.iter().flatten().cloned().collect()
}

/// Owned variant of [`compact`].
pub fn compact_owned(tracks: Vec<Option<Track>>) -> Vec<Track> {
    tracks.into_iter().flatten().collect()
}

/// Maps each non-empty track to its album. Order and duplicates are kept.
pub fn extract_albums(tracks: &[Option<Track>]) -> Vec<Album> {
    tracks.iter().flatten().map(|t| t.album.clone()).collect()
}

/// Maps each non-empty track to its full, ordered artist list.
pub fn extract_primary_artist_groups(tracks: &[Option<Track>]) -> Vec<Vec<Artist>> {
    tracks.iter().flatten().map(|t| t.artists.clone()).collect()
}

/// Keeps the first album seen for each id. Albums without an id cannot be fetched and are dropped.
pub fn unique_albums(albums: Vec<Album>) -> Vec<Album> {
    let mut seen_ids = HashSet::new();
    albums
        .into_iter()
        .filter(|album| !album.id.is_empty())
        .filter(|album| seen_ids.insert(album.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, album_id: &str, artist_ids: &[&str]) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            artists: artist_ids
                .iter()
                .map(|a| Artist {
                    id: a.to_string(),
                    name: format!("Artist {a}"),
                    ..Default::default()
                })
                .collect(),
            album: Album {
                id: album_id.to_string(),
                name: format!("Album {album_id}"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn empty_slots_are_skipped() {
        let tracks = vec![
            Some(track("t1", "a", &["x"])),
            None,
            Some(track("t2", "b", &["y"])),
            None,
            Some(track("t3", "a", &["z"])),
        ];

        let ids: Vec<_> = compact(&tracks).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);

        let albums: Vec<_> = extract_albums(&tracks).into_iter().map(|a| a.id).collect();
        assert_eq!(albums, vec!["a", "b", "a"]);
    }

    #[test]
    fn artist_groups_keep_every_contributor() {
        let tracks = vec![Some(track("t1", "a", &["x", "y"])), None];
        let groups = extract_primary_artist_groups(&tracks);
        assert_eq!(groups.len(), 1);
        let ids: Vec<_> = groups[0].iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn unique_albums_keeps_first_seen_order() {
        let tracks = vec![
            Some(track("t1", "b", &["x"])),
            Some(track("t2", "a", &["x"])),
            Some(track("t3", "b", &["x"])),
            Some(track("t4", "", &["x"])),
        ];
        let albums: Vec<_> = unique_albums(extract_albums(&tracks))
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(albums, vec!["b", "a"]);
    }

    #[test]
    fn compact_owned_matches_compact() {
        let tracks = vec![None, Some(track("t1", "a", &["x"])), None];
        assert_eq!(compact(&tracks), compact_owned(tracks));
    }
}
