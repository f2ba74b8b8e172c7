//! Submit a distance-matrix computation and optionally poll for the
//! result.

use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(about = "Submit a distance-matrix computation")]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
    /// Coordinate matrix as JSON, e.g. '[[60.1,24.9],[60.2,25.0]]'
    #[arg(long)]
    matrix: String,
    #[arg(long, default_value_t = 80)]
    speed_profile: u32,
    #[arg(long, default_value = "FI")]
    country: String,
    /// Poll until the computation finishes and print the result
    #[arg(long)]
    wait: bool,
    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();

    let body = json!({
        "matrix": args.matrix,
        "speed_profile": args.speed_profile,
        "country": args.country,
    });
    let response = client
        .post(format!("{}/dm", args.server))
        .json(&body)
        .send()
        .await?;
    if response.status() != reqwest::StatusCode::CREATED {
        bail!(
            "submission rejected ({}): {}",
            response.status(),
            response.text().await?
        );
    }
    let submitted: Value = response.json().await?;
    let id = submitted["id"].as_str().unwrap_or_default().to_string();
    println!(
        "job {id} (already satisfied: {})",
        submitted["already_satisfied"]
    );

    if !args.wait {
        println!("poll with: GET {}/dm/{id}", args.server);
        return Ok(());
    }

    loop {
        // a 303 on completion is followed automatically, landing on the result
        let response = client
            .get(format!("{}/dm/{id}", args.server))
            .send()
            .await?;
        let status: Value = response.json().await?;

        if let Some(matrix) = status.get("Matrix") {
            println!("{}", serde_json::to_string_pretty(matrix)?);
            return Ok(());
        }

        let progress = status["progress"].as_str().unwrap_or("unknown");
        println!(
            "[{}] progress: {progress}",
            Local::now().format("%H:%M:%S")
        );
        if progress == "failed" {
            bail!("computation failed: {}", status["error"]);
        }
        tokio::time::sleep(std::time::Duration::from_millis(args.poll_ms)).await;
    }
}
