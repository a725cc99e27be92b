use std::path::Path;

use anyhow::Result;
use mdprov::{read_document, ContentId};

pub async fn run(file: &Path) -> Result<()> {
    let content = read_document(file).await?;
    let cid = ContentId::identify(&content);
    tracing::debug!(file = %file.display(), size = content.len(), %cid, "identified");
    println!("{cid}");
    Ok(())
}
