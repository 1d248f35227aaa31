//! JSON dump of raw API responses.
//!
//! `news_digest import --dump FILE` keeps a copy of exactly what the news API
//! returned, which is handy when a field suddenly stops mapping. An existing
//! non-empty file is cleared before the new response is written.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `payload` pretty-printed to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_response(payload: &serde_json::Value, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    if let Ok(meta) = fs::metadata(path).await {
        if meta.len() > 0 {
            fs::write(path, b"").await?;
            info!("Cleared previous dump");
        }
    }

    let json = serde_json::to_string_pretty(payload)?;
    fs::write(path, json).await?;
    info!("Wrote API response dump");
    Ok(())
}
