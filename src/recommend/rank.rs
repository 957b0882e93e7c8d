use std::cmp::Ordering;

use crate::types::Track;

/// Returns a copy of `tracks` ordered by popularity, most popular first.
///
/// Tracks without a popularity value sort after every track that has one and
/// keep their `None`. The sort is stable, so ties stay in input order.
pub fn rank_by_popularity(tracks: &[Track]) -> Vec<Track> {
    let mut ranked = tracks.to_vec();
    ranked.sort_by(|a, b| compare_popularity(a.popularity, b.popularity));
    ranked
}

// `Option` orders `None` below `Some(_)`, so reversing it puts unknown values last.
fn compare_popularity(a: Option<u32>, b: Option<u32>) -> Ordering {
    b.cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, popularity: Option<u32>) -> Track {
        Track {
            id: id.to_string(),
            name: id.to_string(),
            popularity,
            ..Default::default()
        }
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn sorts_descending() {
        let input = vec![track("a", Some(10)), track("b", Some(80)), track("c", Some(45))];
        assert_eq!(ids(&rank_by_popularity(&input)), vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let input = vec![
            track("a", Some(50)),
            track("b", Some(70)),
            track("c", Some(50)),
            track("d", Some(50)),
        ];
        assert_eq!(ids(&rank_by_popularity(&input)), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn unknown_popularity_sorts_last_and_stays_unknown() {
        let input = vec![
            track("a", None),
            track("b", Some(0)),
            track("c", None),
            track("d", Some(3)),
        ];
        let ranked = rank_by_popularity(&input);
        assert_eq!(ids(&ranked), vec!["d", "b", "a", "c"]);
        assert_eq!(ranked[2].popularity, None);
        assert_eq!(ranked[3].popularity, None);
    }

    #[test]
    fn keeps_length_and_leaves_input_untouched() {
        let input = vec![track("a", Some(1)), track("b", None), track("c", Some(9))];
        let ranked = rank_by_popularity(&input);
        assert_eq!(ranked.len(), input.len());
        assert_eq!(ids(&input), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_input() {
        assert!(rank_by_popularity(&[]).is_empty());
    }
}
