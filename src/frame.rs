//! Decoded raster frames.
//!
//! **Why**: The player paints straight from RAM. Fetched bytes are decoded
//! once into an RGBA8 buffer and shared behind `Arc` between the cache and
//! whatever surface displays them.
//!
//! **Used by**: Loader (decode after fetch), FrameCache (storage),
//! player widget (texture upload)

use std::sync::Arc;

/// One decoded frame: native resolution, tightly packed RGBA8.
///
/// Frames inside one sequence may differ in resolution; the renderer resizes
/// its surface per frame rather than scaling pixels.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

/// Frame decode errors. Never escape the engine: a failed decode becomes a
/// settled-but-absent cache slot, nothing more.
#[derive(Debug)]
pub enum FrameError {
    Decode(String),
    EmptyPayload,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Decode(e) => write!(f, "decode error: {}", e),
            FrameError::EmptyPayload => write!(f, "empty payload"),
        }
    }
}

impl std::error::Error for FrameError {}

impl Raster {
    /// Decode an in-memory image payload (PNG/JPEG/TIFF/TGA...) to RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Arc<Self>, FrameError> {
        if bytes.is_empty() {
            return Err(FrameError::EmptyPayload);
        }

        let img = image::load_from_memory(bytes)
            .map_err(|e| FrameError::Decode(e.to_string()))?;

        let width = img.width() as usize;
        let height = img.height() as usize;
        let rgba = img.to_rgba8().into_raw();

        Ok(Arc::new(Self { width, height, rgba }))
    }

    /// Build a raster from raw RGBA8 pixels. `rgba.len()` must equal
    /// `width * height * 4`.
    pub fn from_rgba8(width: usize, height: usize, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), width * height * 4);
        Self { width, height, rgba }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Native resolution as (width, height).
    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Memory footprint in bytes.
    pub fn mem(&self) -> usize {
        self.rgba.len()
    }
}
