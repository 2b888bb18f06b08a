//! Mountable hover preview for a detected sequence.
//!
//! Shows the lowest-numbered member as a static tile; hovering flips through
//! the first frames via [`PreviewCycler`](crate::preview::PreviewCycler).
//! Frames come straight from each member's thumbnail reference through egui's
//! image loaders (`file://` URIs) — no loader instance, no cache beyond the
//! one the presentation layer already keeps. Requires
//! `egui_extras::install_image_loaders` to have run once per context.

use eframe::egui;
use std::time::Instant;

use crate::asset::AssetDescriptor;
use crate::detect::SequenceGroup;
use crate::preview::PreviewCycler;

const TILE_SIZE: egui::Vec2 = egui::vec2(160.0, 110.0);

pub struct PreviewView {
    sequence: SequenceGroup,
    cycler: PreviewCycler,
}

impl PreviewView {
    pub fn new(sequence: SequenceGroup) -> Self {
        Self {
            sequence,
            cycler: PreviewCycler::new(),
        }
    }

    pub fn sequence(&self) -> &SequenceGroup {
        &self.sequence
    }

    fn current_member(&self) -> &AssetDescriptor {
        // Static tile shows the thumbnail member; while cycling, the pointer
        // walks the capped window from the start of the sequence.
        &self.sequence.members()[self.cycler.current()]
    }

    /// Render the tile. `on_click` fires when the user clicks it, typically
    /// to open a full player.
    pub fn ui(&mut self, ui: &mut egui::Ui, on_click: impl FnOnce(&SequenceGroup)) {
        self.cycler.tick(Instant::now());

        let uri = format!("file://{}", self.current_member().fetch_path().display());
        let response = ui
            .vertical(|ui| {
                let img = ui.add(
                    egui::Image::new(uri)
                        .fit_to_exact_size(TILE_SIZE)
                        .sense(egui::Sense::click()),
                );
                ui.label(
                    egui::RichText::new(format!(
                        "{} · {} frames",
                        self.sequence.pattern(),
                        self.sequence.frame_count()
                    ))
                    .small(),
                );
                img
            })
            .inner;

        if response.hovered() {
            self.cycler.start(self.sequence.frame_count());
            ui.ctx().request_repaint_after(self.cycler.step_interval());
        } else if self.cycler.is_running() {
            self.cycler.stop();
        }

        if response.clicked() {
            on_click(&self.sequence);
        }
    }
}
