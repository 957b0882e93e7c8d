use tabled::Table;

use crate::{
    cli::{connect, resolve_market, seed::{SeedSource, build_seed}, spinner},
    error,
    recommend::{PipelineOptions, RecommendationAggregator},
    success, utils, warning,
};

pub async fn recommend(source: SeedSource, market: Option<String>) {
    let market = resolve_market(market);
    let client = connect().await;

    let seed = match build_seed(&client, source, market.as_deref()).await {
        Ok(Some(seed)) => seed,
        Ok(None) => return,
        Err(e) => error!("Cannot build seed. Err: {}", e),
    };

    let options = PipelineOptions {
        market,
        ..Default::default()
    };

    let pb = spinner("Resolving seed...");
    let progress = pb.clone();
    let result = RecommendationAggregator::new(&client, options)
        .with_observer(move |phase| progress.set_message(phase.to_string()))
        .run(seed)
        .await;
    pb.finish_and_clear();

    let pool = match result {
        Ok(pool) => pool,
        Err(e) => error!("Recommendation run failed. Err: {}", e),
    };

    for skipped in &pool.skipped {
        warning!("Skipped album '{}': {}", skipped.album.name, skipped.error);
    }
    if pool.failed_batches > 0 {
        warning!(
            "{} track batch(es) could not be fetched; some albums are incomplete.",
            pool.failed_batches
        );
    }

    if pool.combined_tracks.is_empty() {
        warning!("The seed did not lead to any candidate tracks.");
        return;
    }

    let table = Table::new(utils::track_table_rows(&pool.albums));
    println!("{}", table);
    success!(
        "{} candidate tracks from {} albums",
        pool.combined_tracks.len(),
        pool.albums.len()
    );
}
