//! Mountable egui units: the player and the hover preview.

mod player_view;
mod preview_view;
mod progress;

pub use player_view::PlayerView;
pub use preview_view::PreviewView;
pub use progress::ProgressBar;
