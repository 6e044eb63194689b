//! Document I/O

use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Save a rendered document
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, ProxyError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Load a PDF document, mainly for inspecting output
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}
