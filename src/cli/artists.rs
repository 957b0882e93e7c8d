use tabled::Table;

use crate::{
    cli::{connect, resolve_market, seed::{SeedSource, load_tracks}, spinner},
    error, info,
    recommend::{count_primary_artists, fetch_artists_by_ids, top_artists},
    utils, warning,
};

/// Prints the most frequent primary artists of a seed.
pub async fn artists(source: SeedSource, market: Option<String>, limit: usize, details: bool) {
    let market = resolve_market(market);
    let client = connect().await;

    let pb = spinner("Fetching seed tracks...");
    let tracks = match load_tracks(&client, source, market.as_deref()).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot load seed tracks. Err: {}", e);
        }
    };

    let freq = count_primary_artists(&tracks);
    if freq.is_empty() {
        pb.finish_and_clear();
        warning!("No artists found in the seed.");
        return;
    }
    let top = top_artists(&freq, limit);

    let resolved = if details {
        pb.set_message("Fetching artist details...");
        let ids: Vec<String> = top.iter().map(|c| c.artist.id.clone()).collect();
        let batched = fetch_artists_by_ids(&client, &ids).await;
        if !batched.failures.is_empty() {
            warning!("Some artist details could not be fetched.");
        }
        // a failed batch leaves a gap, so positions only line up without failures
        batched.failures.is_empty().then_some(batched.items)
    } else {
        None
    };
    pb.finish_and_clear();

    let table = Table::new(utils::artist_table_rows(&top, resolved.as_deref()));
    println!("{}", table);
    info!(
        "{} distinct primary artists across {} tracks",
        freq.len(),
        freq.total()
    );
}
