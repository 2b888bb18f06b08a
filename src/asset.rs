//! Asset descriptors handed over by the external asset registry.
//!
//! **Why**: The engine never talks to storage directly. The registry supplies
//! a flat, read-only list of descriptors; everything downstream (detection,
//! loading, previews) works off these.
//!
//! **Used by**: Detector (partition + name matching), Loader (fetch paths),
//! Preview widget (thumbnail references)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Immutable description of one stored asset.
///
/// Owned by the registry; the engine only reads it. `path` points at the
/// full-resolution payload, `thumbnail_path` at a cheaper proxy if one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub id: Uuid,
    pub display_name: String,
    pub mime_type: String,
    pub folder_id: Option<Uuid>,
    pub path: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
}

impl AssetDescriptor {
    /// Build a descriptor straight from a filesystem path, guessing the mime
    /// type from the extension. Used by the dev harness and tests; real
    /// deployments get descriptors from the registry.
    pub fn from_path(path: &Path, folder_id: Option<Uuid>) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            mime_type: mime_for_extension(path).to_string(),
            display_name,
            folder_id,
            path: path.to_path_buf(),
            thumbnail_path: None,
        }
    }

    /// True for raster image assets. Everything else is an unconditional
    /// leftover as far as sequence detection is concerned.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Path the loader should fetch: thumbnail proxy when present, otherwise
    /// the full-resolution payload. Trades fidelity for load speed.
    pub fn fetch_path(&self) -> &Path {
        self.thumbnail_path.as_deref().unwrap_or(&self.path)
    }
}

/// Mime type by file extension. Unknown extensions map to a generic
/// binary type, which routes the asset to leftovers.
fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "tga" => "image/x-tga",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_guesses_mime() {
        let a = AssetDescriptor::from_path(Path::new("/renders/shot_0001.png"), None);
        assert_eq!(a.display_name, "shot_0001.png");
        assert_eq!(a.mime_type, "image/png");
        assert!(a.is_image());

        let b = AssetDescriptor::from_path(Path::new("/renders/notes.txt"), None);
        assert!(!b.is_image());
    }

    #[test]
    fn test_fetch_path_prefers_thumbnail() {
        let mut a = AssetDescriptor::from_path(Path::new("/renders/shot_0001.png"), None);
        assert_eq!(a.fetch_path(), Path::new("/renders/shot_0001.png"));

        a.thumbnail_path = Some(PathBuf::from("/thumbs/shot_0001.jpg"));
        assert_eq!(a.fetch_path(), Path::new("/thumbs/shot_0001.jpg"));
    }
}
