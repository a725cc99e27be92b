use anyhow::{Context, Result};
use mdprov::store::LocalLedger;

use super::load_config;

pub async fn run(limit: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let ledger = config.state().ledger();
    let records = ledger
        .records()
        .await
        .with_context(|| format!("cannot read {}", ledger.path().display()))?;
    tracing::debug!(ledger = %ledger.path().display(), count = records.len(), "ledger read");

    if records.is_empty() {
        println!("No uploads recorded in {}", config.state_dir.display());
        return Ok(());
    }

    let shown = limit.unwrap_or(records.len());
    println!("{} upload(s), newest first:\n", records.len());
    for record in records.iter().rev().take(shown) {
        println!(
            "{}  {}  {}  {} bytes",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.tx_id,
            record.cid,
            record.size
        );
        println!("    {}  {}", record.file, record.url);
    }
    if shown < records.len() {
        println!("\n... {} older record(s) not shown", records.len() - shown);
    }
    Ok(())
}
