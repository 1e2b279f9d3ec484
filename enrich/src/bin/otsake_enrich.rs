//! Enrich a single XML document from stdin
//!
//! Run with:
//! `OTSAKE_ENRICHER_CONFIG=enricher.json otsake-enrich < message.xml`
//!
//! Prints the resulting headers as a JSON object on stdout. Logs go to stderr.

use anyhow::Context;
use otsake::config::{init_tracing, Config, ENV_ENRICHER_CONFIG};
use otsake::{EnricherConfig, Message};
use std::io::Read;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let path = config
        .enricher_config
        .with_context(|| format!("{ENV_ENRICHER_CONFIG} is not set"))?;
    let enricher = EnricherConfig::load(&path)?.into_enricher()?;

    let mut payload = Vec::new();
    std::io::stdin()
        .read_to_end(&mut payload)
        .context("failed to read payload from stdin")?;

    let message = Message::new(payload);
    let enriched = enricher.transform(&message)?;

    tracing::info!(
        id = %enriched.id,
        headers = enriched.headers().len(),
        "message enriched"
    );
    println!("{}", serde_json::to_string_pretty(enriched.headers())?);

    Ok(())
}
