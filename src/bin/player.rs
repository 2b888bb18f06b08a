//! Standalone player window for development and testing.
//!
//! Scans a directory, runs sequence detection over its files, shows a tile
//! per detected sequence and opens a player on click. Directory comes from
//! the first argument or `FLIPDECK_DIR`.

use eframe::egui;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flipdeck::asset::AssetDescriptor;
use flipdeck::detect;
use flipdeck::fetch::DiskFetcher;
use flipdeck::widgets::{PlayerView, PreviewView};

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn scan_dir(dir: &Path) -> Vec<AssetDescriptor> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        warn!("cannot read {}", dir.display());
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .map(|p| AssetDescriptor::from_path(&p, None))
        .collect()
}

fn main() -> eframe::Result<()> {
    init_logger();

    let dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FLIPDECK_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_title("flipdeck"),
        ..Default::default()
    };

    eframe::run_native(
        "flipdeck-player",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(BrowserApp::new(&dir)))
        }),
    )
}

struct BrowserApp {
    previews: Vec<PreviewView>,
    leftover_count: usize,
    open_player: Option<PlayerView>,
}

impl BrowserApp {
    fn new(dir: &Path) -> Self {
        let assets = scan_dir(dir);
        info!("scanned {}: {} assets", dir.display(), assets.len());

        let detection = detect::detect(assets);
        info!(
            "{} sequences, {} leftovers",
            detection.sequences.len(),
            detection.leftovers.len()
        );

        Self {
            previews: detection
                .sequences
                .into_iter()
                .map(PreviewView::new)
                .collect(),
            leftover_count: detection.leftovers.len(),
            open_player: None,
        }
    }
}

impl eframe::App for BrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(player) = &mut self.open_player {
                let mut closed = false;
                player.ui(ui, || closed = true);
                if closed {
                    self.open_player = None;
                }
                return;
            }

            ui.heading("Detected sequences");
            ui.label(format!(
                "{} sequences, {} loose assets",
                self.previews.len(),
                self.leftover_count
            ));
            ui.separator();

            let mut clicked: Option<usize> = None;
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (i, preview) in self.previews.iter_mut().enumerate() {
                        preview.ui(ui, |_| clicked = Some(i));
                    }
                });
            });

            if let Some(i) = clicked {
                let sequence = self.previews[i].sequence().clone();
                self.open_player = Some(PlayerView::new(sequence, Arc::new(DiskFetcher)));
            }
        });
    }
}
