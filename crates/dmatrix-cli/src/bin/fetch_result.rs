//! Fetch the result of a previously submitted computation.

use anyhow::{bail, Result};
use clap::Parser;
use reqwest::Client;
use serde_json::Value;

#[derive(Parser)]
#[command(about = "Fetch a completed distance-matrix result")]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
    /// Job id returned at submission time
    id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();

    let response = client
        .get(format!("{}/dm/{}/result", args.server, args.id))
        .send()
        .await?;
    if !response.status().is_success() {
        bail!(
            "result not available ({}): {}",
            response.status(),
            response.text().await?
        );
    }

    let result: Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&result["Matrix"])?);
    Ok(())
}
