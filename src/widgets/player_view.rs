//! Mountable sequence player: renderer plus transport controls.
//!
//! **Why**: Hosts shouldn't wire up loaders, schedulers and textures by hand.
//! `PlayerView` owns the whole pipeline for one open sequence and exposes a
//! single `ui()` call; the only thing the host learns back is "the user
//! closed me".
//!
//! # Rendering
//!
//! A frame is uploaded as a texture only once its raster is in the cache. If
//! the scheduler's index runs ahead of the loader, the previously painted
//! frame stays on screen rather than blanking. The painted size always
//! matches the raster's native resolution, so mixed-resolution sequences
//! resize the surface frame by frame.
//!
//! # Teardown
//!
//! Dropping the view cancels the loader and releases the cache; pausing (or
//! closing) stops re-arming the repaint clock, so no advance outlives the
//! player.

use eframe::egui;
use log::info;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::cache::FrameCache;
use crate::detect::SequenceGroup;
use crate::fetch::AssetFetcher;
use crate::loader::{FrameLoader, LoadEvent};
use crate::player::{MAX_FPS, MIN_FPS, Playback};
use crate::widgets::progress::ProgressBar;

pub struct PlayerView {
    sequence: SequenceGroup,
    playback: Playback,
    loader: FrameLoader,
    cache: Arc<Mutex<FrameCache>>,
    texture: Option<egui::TextureHandle>,
    shown_index: Option<usize>,
    progress: ProgressBar,
}

impl PlayerView {
    /// Open a player for `sequence`; loading starts immediately.
    pub fn new(sequence: SequenceGroup, fetcher: Arc<dyn AssetFetcher>) -> Self {
        let loader = FrameLoader::start(&sequence, fetcher);
        let cache = loader.cache();
        let playback = Playback::new(sequence.frame_count());
        let mut progress = ProgressBar::new(4.0);
        progress.set_progress(0, sequence.frame_count());

        info!("player opened for {}", sequence.pattern());

        Self {
            sequence,
            playback,
            loader,
            cache,
            texture: None,
            shown_index: None,
            progress,
        }
    }

    pub fn sequence(&self) -> &SequenceGroup {
        &self.sequence
    }

    /// Render one frame of the player. `on_close` fires when the user closes
    /// it; the host is expected to drop the view in response.
    pub fn ui(&mut self, ui: &mut egui::Ui, on_close: impl FnOnce()) {
        self.drain_loader_events(ui.ctx());
        self.playback.tick(Instant::now());
        self.sync_texture(ui.ctx());

        let mut close_requested = false;

        ui.vertical(|ui| {
            self.frame_surface(ui);
            self.progress.show(ui, ui.available_width());
            close_requested = self.transport_row(ui);
        });

        if self.playback.is_playing() {
            // Re-arm the clock for the next advance; pausing stops this,
            // which is what cancels the playback callback chain.
            ui.ctx().request_repaint_after(self.playback.frame_interval() / 2);
        }

        if close_requested {
            self.playback.pause();
            self.loader.cancel();
            info!("player closed for {}", self.sequence.pattern());
            on_close();
        }
    }

    fn drain_loader_events(&mut self, ctx: &egui::Context) {
        let mut saw_event = false;
        for event in self.loader.events().try_iter() {
            saw_event = true;
            if let LoadEvent::Progress { settled, total, .. } = event {
                self.progress.set_progress(settled, total);
            }
        }
        if saw_event {
            // Newly landed frames may include the one we are holding for.
            ctx.request_repaint();
        }
    }

    /// Upload the scheduler's frame if it is loaded; otherwise keep showing
    /// whatever was painted last.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let desired = self.playback.frame_index();
        if self.shown_index == Some(desired) {
            return;
        }

        let cache = self.cache.lock().unwrap();
        let Some(raster) = cache.get(desired) else {
            return; // loader still in flight: hold the last frame
        };

        let (w, h) = raster.resolution();
        let img = egui::ColorImage::from_rgba_unmultiplied([w, h], raster.rgba());
        self.texture = Some(ctx.load_texture(
            format!("{}:{}", self.sequence.pattern(), desired),
            img,
            egui::TextureOptions::LINEAR,
        ));
        self.shown_index = Some(desired);
    }

    fn frame_surface(&self, ui: &mut egui::Ui) {
        match &self.texture {
            Some(texture) => {
                // Native pixel size; fit-to-viewport is the host's business.
                ui.add(egui::Image::new((texture.id(), texture.size_vec2())));
            }
            None => {
                ui.add_sized(
                    egui::vec2(320.0, 180.0),
                    egui::Label::new(egui::RichText::new("loading...").weak()),
                );
            }
        }
    }

    /// Transport controls. Returns true when close was clicked.
    fn transport_row(&mut self, ui: &mut egui::Ui) -> bool {
        let mut close_requested = false;
        let last = self.playback.frame_count().saturating_sub(1);

        ui.horizontal(|ui| {
            if ui.button("⏮").on_hover_text("First frame").clicked() {
                self.playback.seek(0);
            }
            if ui.button("◀").on_hover_text("Step back").clicked() {
                self.playback.step(-1);
            }
            let play_label = if self.playback.is_playing() { "⏸" } else { "⏵" };
            if ui.button(play_label).on_hover_text("Play/Pause").clicked() {
                self.playback.toggle_play();
            }
            if ui.button("▶").on_hover_text("Step forward").clicked() {
                self.playback.step(1);
            }
            if ui.button("⏭").on_hover_text("Last frame").clicked() {
                self.playback.seek(last);
            }

            let mut frame = self.playback.frame_index();
            if ui
                .add(egui::Slider::new(&mut frame, 0..=last).show_value(true))
                .changed()
            {
                self.playback.seek(frame);
            }

            let mut fps = self.playback.fps();
            if ui
                .add(
                    egui::DragValue::new(&mut fps)
                        .range(MIN_FPS..=MAX_FPS)
                        .suffix(" fps"),
                )
                .changed()
            {
                self.playback.set_fps(fps);
            }

            let mut looping = self.playback.looping();
            if ui.checkbox(&mut looping, "loop").changed() {
                self.playback.set_loop(looping);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").on_hover_text("Close player").clicked() {
                    close_requested = true;
                }
            });
        });

        close_requested
    }
}
