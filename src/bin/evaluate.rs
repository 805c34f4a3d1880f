//! Interactive evaluation: reads one URL per line and prints its credibility score.
//! `exit` or `quit` (or end of input) leaves.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use page_credibility::page::ParseFailure;
use page_credibility::{build_service, init_tracing, CredibilityConfig, EvaluationError};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = CredibilityConfig::load()?;
    let service = build_service(&config)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"Enter webpage url (exit to quit): ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match service.evaluate_url(input).await {
            Ok(scored) => println!("Webpage score: {:.5} for {}", scored.score, scored.url),
            Err(EvaluationError::Parse(ParseFailure::InvalidUrl(_))) => println!("Invalid address"),
            Err(_) => println!("Score could not be calculated"),
        }
    }
    Ok(())
}
