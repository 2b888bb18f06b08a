//! Background thread pool for frame fetch/decode work.
//!
//! Closure-based MPMC queue over crossbeam channels. The loader dispatches
//! one job per frame fetch; dropping the pool closes the channel and lets the
//! threads drain out.

use crossbeam_channel::{Sender, unbounded};
use log::{debug, error};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct Workers {
    sender: Sender<Job>,
    _handles: Vec<thread::JoinHandle<()>>,
}

impl Workers {
    /// Pool with `num_threads` named threads.
    pub fn new(num_threads: usize) -> Self {
        let (tx, rx): (Sender<Job>, _) = unbounded();
        let mut handles = Vec::new();

        for worker_id in 0..num_threads.max(1) {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("flipdeck-worker-{}", worker_id))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    debug!("worker {} stopped", worker_id);
                })
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        debug!("workers initialized: {} threads", num_threads.max(1));

        Self {
            sender: tx,
            _handles: handles,
        }
    }

    /// Pool sized for frame loading: three quarters of the cores, never more
    /// than one thread per in-flight fetch.
    pub fn for_loading(max_in_flight: usize) -> Self {
        let threads = (num_cpus::get() * 3 / 4).clamp(1, max_in_flight.max(1));
        Self::new(threads)
    }

    /// Run a closure on a worker thread. Fire and forget; results travel back
    /// over whatever channel the closure captured.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.sender.send(Box::new(f)) {
            error!("failed to enqueue job: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_jobs_run_and_report_back() {
        let workers = Workers::new(2);
        let (tx, rx) = bounded(8);

        for i in 0..8 {
            let tx = tx.clone();
            workers.execute(move || {
                tx.send(i).unwrap();
            });
        }

        let mut got: Vec<i32> = rx.iter().take(8).collect();
        got.sort();
        assert_eq!(got, (0..8).collect::<Vec<_>>());
    }
}
