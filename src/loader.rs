//! Background frame loading in settled batches.
//!
//! **Why**: A sequence can hold thousands of frames. Requesting everything at
//! once floods the transport layer; loading one by one wastes the worker
//! pool. Frames are fetched in fixed batches of [`BATCH_SIZE`]: a batch must
//! settle completely (every fetch succeeded or failed) before the next one
//! dispatches, so at most [`BATCH_SIZE`] fetches are ever in flight.
//!
//! **Used by**: Player widget (per-open-player loader instance)
//!
//! Each fetch prefers the member's thumbnail reference over the full
//! resolution path. A failed fetch or decode settles the slot as absent and
//! is never retried within the session; nothing aborts the batch or the
//! load. Progress is reported once per settled frame.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::cache::FrameCache;
use crate::detect::SequenceGroup;
use crate::fetch::AssetFetcher;
use crate::frame::Raster;
use crate::workers::Workers;

/// Peak concurrent in-flight fetches.
pub const BATCH_SIZE: usize = 10;

/// Loader notifications, one `Progress` per settled frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Progress {
        percent: u8,
        settled: usize,
        total: usize,
    },
    Finished,
}

/// Handle to a background load for one open player.
///
/// Dropping the handle cancels it: frames already in flight settle, further
/// batches never dispatch.
pub struct FrameLoader {
    cache: Arc<Mutex<FrameCache>>,
    events: Receiver<LoadEvent>,
    cancel: Arc<AtomicBool>,
    driver: Option<thread::JoinHandle<()>>,
}

impl FrameLoader {
    /// Start loading every member of `sequence` through `fetcher`.
    pub fn start(sequence: &SequenceGroup, fetcher: Arc<dyn AssetFetcher>) -> Self {
        let paths: Vec<PathBuf> = sequence
            .members()
            .iter()
            .map(|m| m.fetch_path().to_path_buf())
            .collect();

        info!(
            "loading {} ({} frames, batches of {})",
            sequence.pattern(),
            paths.len(),
            BATCH_SIZE
        );

        let cache = Arc::new(Mutex::new(FrameCache::new(paths.len())));
        let cancel = Arc::new(AtomicBool::new(false));
        let (event_tx, event_rx) = unbounded();

        let driver = {
            let cache = Arc::clone(&cache);
            let cancel = Arc::clone(&cancel);
            thread::Builder::new()
                .name("flipdeck-loader".into())
                .spawn(move || {
                    let complete = run_batches(&paths, fetcher, &cache, &cancel, |cache| {
                        let _ = event_tx.send(LoadEvent::Progress {
                            percent: cache.progress_percent(),
                            settled: cache.settled_count(),
                            total: cache.frame_count(),
                        });
                    });
                    if complete {
                        let _ = event_tx.send(LoadEvent::Finished);
                    }
                })
                .expect("failed to spawn loader thread")
        };

        Self {
            cache,
            events: event_rx,
            cancel,
            driver: Some(driver),
        }
    }

    /// Shared cache this loader populates.
    pub fn cache(&self) -> Arc<Mutex<FrameCache>> {
        Arc::clone(&self.cache)
    }

    /// Pending notifications since the last drain.
    pub fn events(&self) -> &Receiver<LoadEvent> {
        &self.events
    }

    /// Rounded load progress.
    pub fn progress_percent(&self) -> u8 {
        self.cache.lock().unwrap().progress_percent()
    }

    /// Stop dispatching further batches. In-flight fetches still settle.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Block until the driver exits (tests and headless callers).
    pub fn wait(mut self) -> Arc<Mutex<FrameCache>> {
        if let Some(driver) = self.driver.take() {
            let _ = driver.join();
        }
        Arc::clone(&self.cache)
    }
}

impl Drop for FrameLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Load a sequence on the calling thread, reporting rounded percent once per
/// settled frame. The worker pool still parallelizes fetches inside a batch.
pub fn load_blocking(
    sequence: &SequenceGroup,
    fetcher: Arc<dyn AssetFetcher>,
    mut on_progress: impl FnMut(u8),
) -> FrameCache {
    let paths: Vec<PathBuf> = sequence
        .members()
        .iter()
        .map(|m| m.fetch_path().to_path_buf())
        .collect();

    let cache = Arc::new(Mutex::new(FrameCache::new(paths.len())));
    let cancel = AtomicBool::new(false);
    run_batches(&paths, fetcher, &cache, &cancel, |cache| {
        on_progress(cache.progress_percent())
    });

    Arc::try_unwrap(cache)
        .expect("no outstanding cache references after a blocking load")
        .into_inner()
        .unwrap()
}

/// Batch driver. Returns true when every batch was dispatched and settled,
/// false when cancelled at a batch boundary. `on_settled` runs under the
/// cache lock after each settled fetch.
fn run_batches(
    paths: &[PathBuf],
    fetcher: Arc<dyn AssetFetcher>,
    cache: &Arc<Mutex<FrameCache>>,
    cancel: &AtomicBool,
    mut on_settled: impl FnMut(&FrameCache),
) -> bool {
    let workers = Workers::for_loading(BATCH_SIZE);

    for (batch_idx, batch) in paths.chunks(BATCH_SIZE).enumerate() {
        if cancel.load(Ordering::Relaxed) {
            debug!("load cancelled before batch {}", batch_idx);
            return false;
        }

        let base = batch_idx * BATCH_SIZE;
        let (settle_tx, settle_rx): (Sender<(usize, Option<Arc<Raster>>)>, _) =
            bounded(batch.len());

        for (offset, path) in batch.iter().enumerate() {
            let index = base + offset;
            let path = path.clone();
            let fetcher = Arc::clone(&fetcher);
            let settle_tx = settle_tx.clone();
            workers.execute(move || {
                let raster = fetch_one(fetcher.as_ref(), &path);
                // Receiver only disappears if the driver died; nothing to do.
                let _ = settle_tx.send((index, raster));
            });
        }
        drop(settle_tx);

        // The batch is complete only when every request settled; the next
        // batch is not dispatched until then.
        for (index, raster) in settle_rx.iter() {
            let mut cache = cache.lock().unwrap();
            cache.settle(index, raster);
            on_settled(&cache);
        }
    }

    true
}

fn fetch_one(fetcher: &dyn AssetFetcher, path: &Path) -> Option<Arc<Raster>> {
    let bytes = match fetcher.fetch(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("fetch failed for {}: {}", path.display(), e);
            return None;
        }
    };
    match Raster::decode(&bytes) {
        Ok(raster) => Some(raster),
        Err(e) => {
            warn!("decode failed for {}: {}", path.display(), e);
            None
        }
    }
}
