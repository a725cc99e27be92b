use std::path::Path;

use anyhow::Result;
use mdprov::{build_service, read_document, DedupSource, Origin, UploadRequest};

use super::load_config;

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

pub async fn run(
    file: &Path,
    author: Option<String>,
    file_name: Option<String>,
    source: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config)?;

    let is_markdown = file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MARKDOWN_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if !is_markdown {
        tracing::warn!(file = %file.display(), "file does not look like markdown");
    }

    let content = read_document(file).await?;
    let display_name = file_name.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    });

    let mut request = UploadRequest::new(display_name.clone()).with_file_name(display_name.clone());
    if let Some(author) = author.or_else(|| config.author.clone()) {
        request = request.with_author(author);
    }
    if let Some(source) = source {
        request = request.with_source(source);
    }

    tracing::info!(file = %display_name, size = content.len(), "uploading document");
    let result = match service.upload(&content, &request).await {
        Ok(result) => result,
        Err(e) => {
            if e.is_insufficient_funds() {
                eprintln!("hint: fund the signing wallet, then retry");
            } else if e.is_connectivity() {
                eprintln!("hint: check your connection and MP_UPLOAD_URL, then retry");
            }
            return Err(e.into());
        }
    };
    tracing::debug!(item_id = %result.item_id, origin = ?result.origin, "upload finished");

    match result.origin {
        Origin::New => println!("Uploaded"),
        Origin::Existing(DedupSource::Local) => println!("Already recorded (local ledger)"),
        Origin::Existing(DedupSource::Remote) => println!("Already on the ledger (remote index)"),
    }
    println!("  CID:        {}", result.content_id);
    println!("  Item:       {}", result.item_id);
    println!("  Size:       {} bytes", result.size);
    println!("  URL:        {}", result.gateway_url);
    println!("  Explorer:   {}", result.viewblock_url);
    Ok(())
}
