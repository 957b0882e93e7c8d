//! Primary-artist frequency analysis.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Artist, Track};

/// Occurrence count per primary-artist id.
///
/// Besides the counts, the map remembers the order in which ids were first
/// seen and the first [`Artist`] record carrying each id, which is what
/// [`top_artists`] resolves back to.
#[derive(Debug, Clone, Default)]
pub struct FrequencyMap {
    counts: HashMap<String, usize>,
    first_seen: Vec<String>,
    artists: HashMap<String, Artist>,
}

impl FrequencyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `artist`.
    pub fn record(&mut self, artist: &Artist) {
        match self.counts.get_mut(&artist.id) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(artist.id.clone(), 1);
                self.first_seen.push(artist.id.clone());
                self.artists.insert(artist.id.clone(), artist.clone());
            }
        }
    }

    /// Count for `artist_id`; `None` if the id was never recorded.
    pub fn get(&self, artist_id: &str) -> Option<usize> {
        self.counts.get(artist_id).copied()
    }

    /// First artist record seen with `artist_id`.
    pub fn artist(&self, artist_id: &str) -> Option<&Artist> {
        self.artists.get(artist_id)
    }

    /// Number of distinct artists.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Artist ids in first-seen order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.first_seen.iter().map(String::as_str)
    }
}

/// An artist with the number of tracks it leads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistCount {
    pub artist: Artist,
    pub count: usize,
}

/// Counts the first-listed artist of every non-empty track.
///
/// Co-artists are not counted. Tracks without any artist contribute nothing,
/// and neither do tracks whose primary artist has no id (local files), since
/// artists are told apart by id only.
///
/// # Arguments
///
/// * `tracks` - Track collection, possibly with empty slots
///
/// # Example
///
/// ```
/// use spotseed::recommend::{count_primary_artists, top_artists};
///
/// let tracks: Vec<Option<Track>> = pool.combined_tracks.into_iter().map(Some).collect();
/// let freq = count_primary_artists(&tracks);
/// for entry in top_artists(&freq, 10) {
///     println!("{} ({})", entry.artist.name, entry.count);
/// }
/// ```
pub fn count_primary_artists(tracks: &[Option<Track>]) -> FrequencyMap {
    let mut freq = FrequencyMap::new();
    for artist in tracks
        .iter()
        .flatten()
        .filter_map(Track::primary_artist)
        .filter(|artist| !artist.id.is_empty())
    {
        freq.record(artist);
    }
    freq
}

/// The `limit` most frequent artists, most frequent first.
///
/// Equal counts keep the order in which the ids were first encountered.
/// Never returns more than `limit` entries; `limit = 0` returns none.
///
/// # Arguments
///
/// * `freq` - Counts from [`count_primary_artists`]
/// * `limit` - Maximum number of artists to return
pub fn top_artists(freq: &FrequencyMap, limit: usize) -> Vec<ArtistCount> {
    let mut ranked: Vec<(&str, usize)> = freq
        .ids()
        .map(|id| (id, freq.get(id).unwrap_or_default()))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));

    ranked
        .into_iter()
        .take(limit)
        .filter_map(|(id, count)| {
            freq.artist(id).map(|artist| ArtistCount {
                artist: artist.clone(),
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(id: &str, name: &str) -> Artist {
        Artist {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn track(artists: &[Artist]) -> Track {
        Track {
            id: "t".to_string(),
            name: "t".to_string(),
            artists: artists.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn counts_only_primary_artists() {
        let x = artist("x", "X");
        let y = artist("y", "Y");
        let tracks = vec![
            Some(track(&[x.clone(), y.clone()])),
            None,
            Some(track(&[x.clone()])),
            Some(track(&[y.clone(), x.clone()])),
        ];

        let freq = count_primary_artists(&tracks);
        assert_eq!(freq.get("x"), Some(2));
        assert_eq!(freq.get("y"), Some(1));
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.total(), 3);
    }

    #[test]
    fn resolves_first_record_for_an_id() {
        let tracks = vec![
            Some(track(&[artist("x", "First Name")])),
            Some(track(&[artist("x", "Renamed")])),
        ];
        let freq = count_primary_artists(&tracks);
        assert_eq!(freq.artist("x").map(|a| a.name.as_str()), Some("First Name"));
    }

    #[test]
    fn top_artists_sorts_and_truncates() {
        let tracks = vec![
            Some(track(&[artist("a", "A")])),
            Some(track(&[artist("b", "B")])),
            Some(track(&[artist("b", "B")])),
            Some(track(&[artist("c", "C")])),
            Some(track(&[artist("c", "C")])),
            Some(track(&[artist("c", "C")])),
        ];
        let freq = count_primary_artists(&tracks);

        let top = top_artists(&freq, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].artist.id, "c");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[1].artist.id, "b");

        assert!(top_artists(&freq, 0).is_empty());
        assert_eq!(top_artists(&freq, 10).len(), 3);
    }

    #[test]
    fn ties_break_by_first_encounter() {
        let tracks = vec![
            Some(track(&[artist("late", "Late")])),
            Some(track(&[artist("early", "Early")])),
            Some(track(&[artist("early", "Early")])),
            Some(track(&[artist("late", "Late")])),
            Some(track(&[artist("solo", "Solo")])),
        ];
        let freq = count_primary_artists(&tracks);
        let ids: Vec<_> = top_artists(&freq, 3)
            .into_iter()
            .map(|c| c.artist.id)
            .collect();
        assert_eq!(ids, vec!["late", "early", "solo"]);
    }

    #[test]
    fn artists_without_id_are_not_merged() {
        let json = r#"[
            {"id": "t1", "name": "One", "artists": [{"id": null, "name": "Alice"}]},
            {"id": "t2", "name": "Two", "artists": [{"id": null, "name": "Bob"}]},
            {"id": "t3", "name": "Three", "artists": [{"id": "real", "name": "Real"}]}
        ]"#;
        let tracks: Vec<Option<Track>> = serde_json::from_str(json).unwrap();

        let freq = count_primary_artists(&tracks);
        assert_eq!(freq.get(""), None);
        assert_eq!(freq.len(), 1);

        let top = top_artists(&freq, 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].artist.name, "Real");
        assert_eq!(top[0].count, 1);
    }

    #[test]
    fn empty_collection() {
        let freq = count_primary_artists(&[None, None]);
        assert!(freq.is_empty());
        assert_eq!(freq.total(), 0);
        assert!(top_artists(&freq, 5).is_empty());
    }
}
