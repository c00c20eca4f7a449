//! Public URLs for files in the store's object storage.

use url::Url;

use crate::error::{Result, StoreError};
use crate::rest::parse_base_url;

/// Bucket the scheduler uploads exam schedule PDFs into.
pub const DEFAULT_BUCKET: &str = "schedule-pdfs";

/// `{base}/storage/v1/object/public/{bucket}/{path}`.
///
/// Each `/`-separated segment of `path` is percent-encoded; empty segments
/// (leading, trailing or doubled slashes) are dropped.
pub fn public_url(base_url: &str, bucket: &str, path: &str) -> Result<Url> {
    if bucket.trim().is_empty() {
        return Err(StoreError::InvalidConfig("storage bucket is empty".into()));
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(StoreError::InvalidConfig(format!(
            "object path {path:?} is empty"
        )));
    }

    let mut url = parse_base_url(base_url)?;
    {
        let mut parts = url
            .path_segments_mut()
            .map_err(|_| StoreError::InvalidConfig(format!("{base_url} cannot be a base")))?;
        parts
            .pop_if_empty()
            .extend(["storage", "v1", "object", "public", bucket])
            .extend(segments);
    }
    Ok(url)
}
