//! Painted load-progress bar.

use eframe::egui;

/// Thin horizontal bar showing settled frames against the sequence total.
pub struct ProgressBar {
    settled: usize,
    total: usize,
    height: f32,
    fill_color: egui::Color32,
}

impl ProgressBar {
    pub fn new(height: f32) -> Self {
        Self {
            settled: 0,
            total: 0,
            height,
            fill_color: egui::Color32::from_rgb(80, 200, 120),
        }
    }

    pub fn set_progress(&mut self, settled: usize, total: usize) {
        self.settled = settled;
        self.total = total;
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.settled == self.total
    }

    pub fn show(&self, ui: &mut egui::Ui, width: f32) {
        let fraction = if self.total > 0 {
            (self.settled as f32 / self.total as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(width, self.height), egui::Sense::hover());

        ui.painter()
            .rect_filled(rect, 2.0, egui::Color32::from_gray(40));

        if fraction > 0.0 {
            let fill =
                egui::Rect::from_min_size(rect.min, egui::vec2(rect.width() * fraction, rect.height()));
            ui.painter().rect_filled(fill, 2.0, self.fill_color);
        }
    }
}
