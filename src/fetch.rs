//! Asset-fetch capability: the seam to the storage collaborator.
//!
//! The engine never assumes where asset bytes live. The surrounding system
//! provides a fetcher; the bundled [`DiskFetcher`] covers local files for the
//! dev harness and tests.

use std::path::Path;

/// Returns the raw payload for an asset path or thumbnail reference.
/// Failures are reported to the caller, which records the frame as settled
/// but absent; nothing retries or escalates.
pub trait AssetFetcher: Send + Sync + 'static {
    fn fetch(&self, path: &Path) -> anyhow::Result<Vec<u8>>;
}

/// Fetcher reading straight from the local filesystem.
#[derive(Debug, Default)]
pub struct DiskFetcher;

impl AssetFetcher for DiskFetcher {
    fn fetch(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_fetcher_missing_file() {
        let err = DiskFetcher.fetch(Path::new("/nonexistent/frame.png"));
        assert!(err.is_err());
    }
}
