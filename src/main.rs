mod daily_points;
mod export_results;
mod price_history;

use std::path::Path;

// 30-day bitcoin history from the public coinranking API.
const ENDPOINT: &str = "https://api.coinranking.com/v1/public/coin/1/history/30d";
const OUTPUT_FILE: &str = "results.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Step 1: Fetch Raw History
    println!("\n--- Step 1: Fetching Price History ---");
    let raw = price_history::fetch(ENDPOINT).await;

    // Step 2: Reduce To Daily Points
    println!("\n--- Step 2: Extracting Daily Points ---");
    let series = daily_points::extract(&raw)?;

    // Step 3: Annotate And Write Results
    println!("\n--- Step 3: Exporting Results ---");
    export_results::export(&series, Path::new(OUTPUT_FILE), true).await?;

    println!("Results saved to {}", OUTPUT_FILE);
    Ok(())
}
