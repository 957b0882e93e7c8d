use spotseed::recommend::{AlbumContribution, ArtistCount};
use spotseed::types::{Album, Artist, Track};
use spotseed::utils::*;

// Helper function to create a test track
fn create_test_track(id: &str, name: &str, artists: &[&str], popularity: Option<u32>) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: artists
            .iter()
            .map(|a| Artist {
                id: format!("{}_id", a),
                name: a.to_string(),
                ..Default::default()
            })
            .collect(),
        popularity,
        duration_ms: 125_000,
        ..Default::default()
    }
}

// Helper function to create a test artist with details
fn create_test_artist(id: &str, name: &str, genres: &[&str], popularity: Option<u32>) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        popularity,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

#[test]
fn test_parse_spotify_id_bare() {
    assert_eq!(
        parse_spotify_id("37i9dQZF1DXcBWIGoYBM5M", "playlist"),
        Some("37i9dQZF1DXcBWIGoYBM5M".to_string())
    );
    // surrounding whitespace is ignored
    assert_eq!(
        parse_spotify_id("  4uLU6hMCjMI75M1A2tKUQC ", "track"),
        Some("4uLU6hMCjMI75M1A2tKUQC".to_string())
    );
}

#[test]
fn test_parse_spotify_id_uri() {
    assert_eq!(
        parse_spotify_id("spotify:track:4uLU6hMCjMI75M1A2tKUQC", "track"),
        Some("4uLU6hMCjMI75M1A2tKUQC".to_string())
    );
    // wrong entity kind
    assert_eq!(
        parse_spotify_id("spotify:album:4uLU6hMCjMI75M1A2tKUQC", "track"),
        None
    );
    assert_eq!(parse_spotify_id("spotify:track:", "track"), None);
}

#[test]
fn test_parse_spotify_id_url() {
    assert_eq!(
        parse_spotify_id(
            "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc123",
            "playlist"
        ),
        Some("37i9dQZF1DXcBWIGoYBM5M".to_string())
    );
    // localized URLs carry an extra path segment
    assert_eq!(
        parse_spotify_id(
            "https://open.spotify.com/intl-de/track/4uLU6hMCjMI75M1A2tKUQC",
            "track"
        ),
        Some("4uLU6hMCjMI75M1A2tKUQC".to_string())
    );
    assert_eq!(
        parse_spotify_id("https://open.spotify.com/album/4uLU6hMCjMI75M1A2tKUQC", "track"),
        None
    );
    assert_eq!(parse_spotify_id("https://open.spotify.com/", "track"), None);
}

#[test]
fn test_parse_spotify_id_rejects_garbage() {
    assert_eq!(parse_spotify_id("", "track"), None);
    assert_eq!(parse_spotify_id("not an id", "track"), None);
    assert_eq!(parse_spotify_id("abc-def", "track"), None);
}

#[test]
fn test_parse_track_ref() {
    assert_eq!(parse_track_ref("spotify:track:abc123"), Ok("abc123".to_string()));

    let err = parse_track_ref("").unwrap_err();
    assert!(err.contains("cannot be empty"));

    let err = parse_track_ref("spotify:playlist:abc123").unwrap_err();
    assert!(err.contains("invalid track reference"));
}

#[test]
fn test_parse_playlist_ref() {
    assert!(parse_playlist_ref("37i9dQZF1DXcBWIGoYBM5M").is_ok());
    assert!(parse_playlist_ref("spotify:track:abc").is_err());
}

#[test]
fn test_parse_market_arg() {
    assert_eq!(parse_market_arg("se"), Ok("SE".to_string()));
    assert!(parse_market_arg("Sweden").is_err());
}

#[test]
fn test_format_popularity() {
    assert_eq!(format_popularity(Some(0)), "0");
    assert_eq!(format_popularity(Some(87)), "87");
    // unknown popularity is shown, not turned into zero
    assert_eq!(format_popularity(None), "-");
}

#[test]
fn test_format_genres_takes_first_entries() {
    let artist = create_test_artist("a", "A", &["rock", "indie", "shoegaze", "pop"], None);
    assert_eq!(format_genres(&artist, 3), "rock,indie,shoegaze");
    assert_eq!(format_genres(&artist, 0), "");
}

#[test]
fn test_track_table_rows_number_within_album() {
    let albums = vec![
        AlbumContribution {
            album: Album {
                id: "a".to_string(),
                name: "First".to_string(),
                ..Default::default()
            },
            tracks: vec![
                create_test_track("t1", "One", &["X", "Y"], Some(70)),
                create_test_track("t2", "Two", &["X"], None),
            ],
        },
        AlbumContribution {
            album: Album {
                id: "b".to_string(),
                name: "Second".to_string(),
                ..Default::default()
            },
            tracks: vec![create_test_track("t3", "Three", &["Z"], Some(12))],
        },
    ];

    let rows = track_table_rows(&albums);
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].album, "First");
    assert_eq!(rows[0].position, 1);
    assert_eq!(rows[0].artists, "X, Y");
    assert_eq!(rows[0].popularity, "70");
    assert_eq!(rows[0].duration, "02:05");

    assert_eq!(rows[1].position, 2);
    assert_eq!(rows[1].popularity, "-");

    // numbering restarts per album
    assert_eq!(rows[2].album, "Second");
    assert_eq!(rows[2].position, 1);
}

#[test]
fn test_artist_table_rows_prefer_details() {
    let counts = vec![
        ArtistCount {
            artist: create_test_artist("x", "X", &[], None),
            count: 4,
        },
        ArtistCount {
            artist: create_test_artist("y", "Y", &[], None),
            count: 2,
        },
    ];
    let details = vec![
        Some(create_test_artist("x", "X Full", &["jazz"], Some(55))),
        None,
    ];

    let rows = artist_table_rows(&counts, Some(details.as_slice()));
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].name, "X Full");
    assert_eq!(rows[0].tracks, 4);
    assert_eq!(rows[0].popularity, "55");
    assert_eq!(rows[0].genres, "jazz");

    // missing details fall back to the counted record
    assert_eq!(rows[1].name, "Y");
    assert_eq!(rows[1].popularity, "-");

    let plain = artist_table_rows(&counts, None);
    assert_eq!(plain[0].name, "X");
}
