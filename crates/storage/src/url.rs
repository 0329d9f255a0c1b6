//! Download URL construction and parsing.
//!
//! Download URLs look like
//! `{base}/b/{bucket}/o/{percent-encoded path}?alt=media&token={token}`.

use crate::client::StorageError;

/// Marker preceding the object path in a download URL.
const OBJECT_MARKER: &str = "/o/";

/// Build the public download URL for an object.
pub fn download_url(base_url: &str, bucket: &str, path: &str, token: &str) -> String {
    format!(
        "{base_url}/b/{bucket}/o/{}?alt=media&token={token}",
        urlencoding::encode(path)
    )
}

/// Extract the object path from a download URL.
///
/// The URL is percent-decoded first, then the path is taken from just after
/// `/o/` up to the next `?`. URLs missing either marker, or yielding an empty
/// path, are rejected rather than guessed at.
pub fn storage_path_from_download_url(url: &str) -> Result<String, StorageError> {
    let invalid = || StorageError::InvalidDownloadUrl(url.to_string());

    let decoded = urlencoding::decode(url).map_err(|_| invalid())?;
    let start = decoded.find(OBJECT_MARKER).ok_or_else(invalid)? + OBJECT_MARKER.len();
    let rest = &decoded[start..];
    let end = rest.find('?').ok_or_else(invalid)?;

    let path = &rest[..end];
    if path.is_empty() {
        return Err(invalid());
    }
    Ok(path.to_string())
}
