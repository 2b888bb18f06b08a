//! flipdeck — frame-sequence detection and synchronized playback.
//!
//! Given an unordered list of asset descriptors from a registry, the engine
//! infers which still images form numbered animation sequences, loads frame
//! data in bounded batches in the background, and plays sequences back at an
//! adjustable rate with drop-resistant timing.
//!
//! Pipeline, one direction only:
//! asset list → [`detect::detect`] → [`detect::SequenceGroup`] →
//! [`loader::FrameLoader`] → [`cache::FrameCache`] → [`player::Playback`] →
//! player widget. Hover previews bypass the loader entirely and read
//! thumbnail references directly.
//!
//! Nothing in here is fatal: malformed names become leftovers, failed fetches
//! become absent frames, out-of-range transport actions clamp.

pub mod asset;
pub mod cache;
pub mod detect;
pub mod fetch;
pub mod frame;
pub mod loader;
pub mod player;
pub mod preview;
pub mod widgets;
pub mod workers;

pub use asset::AssetDescriptor;
pub use cache::{FrameCache, FrameSlot};
pub use detect::{DetectOptions, Detection, SequenceGroup, detect, detect_with};
pub use fetch::{AssetFetcher, DiskFetcher};
pub use frame::Raster;
pub use loader::{BATCH_SIZE, FrameLoader, LoadEvent};
pub use player::Playback;
pub use preview::PreviewCycler;
pub use widgets::{PlayerView, PreviewView};
