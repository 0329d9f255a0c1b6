//! Object storage helper for recipe images.
//!
//! [`StorageClient`] uploads files with progress reporting and deletes them
//! again given the download URL handed out at upload time.

pub mod client;
pub mod url;

pub use client::{StorageClient, StorageConfig, StorageError};
pub use url::{download_url, storage_path_from_download_url};
