use anyhow::{Context, Result};
use mdprov::{build_index_sync, PointerOutcome};

use super::load_config;

pub async fn run() -> Result<()> {
    let config = load_config()?;
    let sync = build_index_sync(&config)?;

    tracing::info!(name = ?config.arns_name, "publishing index");
    let outcome = sync.sync().await.context("index sync failed")?;
    tracing::debug!(
        item_id = %outcome.upload.item_id,
        records = outcome.version.transaction_count,
        "index published"
    );

    println!("Index published");
    println!("  Item:     {}", outcome.upload.item_id);
    println!("  CID:      {}", outcome.upload.content_id);
    println!("  Records:  {}", outcome.version.transaction_count);
    println!("  Size:     {} bytes", outcome.upload.size);
    println!("  URL:      {}", outcome.upload.gateway_url);

    match outcome.pointer {
        PointerOutcome::Updated { pointer_tx } => {
            if let Some(name) = config.arns_name.as_deref() {
                println!("  Name:     https://{name}.ar.io");
            }
            println!("  Pointer:  {pointer_tx}");
        }
        PointerOutcome::Failed(reason) => {
            eprintln!("warning: index uploaded but the name was not updated: {reason}");
        }
    }
    Ok(())
}
