//! Serial render worker with request coalescing.
//!
//! Slider drags produce bursts of render requests. The worker keeps a single
//! "latest request" slot: submitting while a request is still waiting
//! replaces it, so at most one render runs at a time and the most recent
//! input always wins. Every finished render is published with the generation
//! number of the request that produced it.

use crate::core::error::PipelineResult;
use crate::core::types::{RenderedImage, SourceImage};
use crate::execution::pipeline::Pipeline;
use crate::filters::variant::FilterVariant;
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Inputs for one render.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Image to filter
    pub source: SourceImage,
    /// Filter to apply
    pub variant: FilterVariant,
    /// Intensity slider in `[0, 1]`
    pub intensity: f64,
    /// Radius slider in `[0, 1]`
    pub radius: f64,
}

/// A finished render.
#[derive(Debug)]
pub struct RenderOutcome {
    /// Generation of the request this render answers.
    pub generation: u64,
    /// Rendered image or the pipeline error
    pub result: PipelineResult<RenderedImage>,
}

#[derive(Default)]
struct Slot {
    pending: Option<(u64, RenderRequest)>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
    latest: AtomicU64,
    coalesced: AtomicU64,
}

/// Background thread that renders requests one at a time.
pub struct RenderWorker {
    shared: Arc<Shared>,
    outcomes: Receiver<RenderOutcome>,
    thread: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Start a worker rendering through `pipeline`.
    pub fn spawn(pipeline: Pipeline) -> std::io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let (tx, rx) = channel::unbounded();

        let thread = thread::Builder::new()
            .name("instafilter-render".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                move || run(pipeline, shared, tx)
            })?;

        Ok(Self {
            shared,
            outcomes: rx,
            thread: Some(thread),
        })
    }

    /// Queue a render, replacing any request that has not started yet.
    ///
    /// Returns the generation assigned to this request.
    pub fn submit(&self, request: RenderRequest) -> u64 {
        let mut slot = self.shared.slot.lock();
        let generation = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((old, _)) = slot.pending.replace((generation, request)) {
            trace!("Render request {} superseded by {}", old, generation);
            self.shared.coalesced.fetch_add(1, Ordering::Relaxed);
        }
        drop(slot);

        self.shared.wake.notify_one();
        generation
    }

    /// Channel of finished renders, in completion order.
    pub fn outcomes(&self) -> &Receiver<RenderOutcome> {
        &self.outcomes
    }

    /// True if `generation` is the most recently submitted request.
    pub fn is_latest(&self, generation: u64) -> bool {
        self.shared.latest.load(Ordering::SeqCst) == generation
    }

    /// Number of requests replaced before they were rendered.
    pub fn coalesced_count(&self) -> u64 {
        self.shared.coalesced.load(Ordering::Relaxed)
    }

    /// Stop the worker after its current render and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shared.slot.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Render worker panicked");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(pipeline: Pipeline, shared: Arc<Shared>, tx: Sender<RenderOutcome>) {
    debug!("Render worker started");
    loop {
        let (generation, request) = {
            let mut slot = shared.slot.lock();
            loop {
                if slot.shutdown {
                    debug!("Render worker stopping");
                    return;
                }
                if let Some(next) = slot.pending.take() {
                    break next;
                }
                shared.wake.wait(&mut slot);
            }
        };

        let result = pipeline.apply(&request.source, request.variant, request.intensity, request.radius);
        if tx.send(RenderOutcome { generation, result }).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::builtin::test_support::sample_image;
    use std::time::Duration;

    fn request(intensity: f64) -> RenderRequest {
        RenderRequest {
            source: SourceImage::new(sample_image(32, 32)),
            variant: FilterVariant::Bloom,
            intensity,
            radius: 0.5,
        }
    }

    #[test]
    fn test_single_render() {
        let worker = RenderWorker::spawn(Pipeline::with_builtins()).unwrap();
        let generation = worker.submit(request(0.3));

        let outcome = worker.outcomes().recv_timeout(Duration::from_secs(30)).unwrap();
        assert_eq!(outcome.generation, generation);
        assert!(worker.is_latest(generation));
        assert!(outcome.result.is_ok());
        worker.shutdown();
    }

    #[test]
    fn test_burst_ends_with_latest_generation() {
        let worker = RenderWorker::spawn(Pipeline::with_builtins()).unwrap();
        let mut last = 0;
        for i in 0..20 {
            last = worker.submit(request(i as f64 / 20.0));
        }

        let mut received = Vec::new();
        loop {
            let outcome = worker.outcomes().recv_timeout(Duration::from_secs(30)).unwrap();
            received.push(outcome.generation);
            if outcome.generation == last {
                break;
            }
        }

        // Generations arrive in increasing order and never exceed submissions.
        assert!(received.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(received.len() as u64 + worker.coalesced_count(), 20);
    }

    #[test]
    fn test_drop_stops_idle_worker() {
        let worker = RenderWorker::spawn(Pipeline::with_builtins()).unwrap();
        drop(worker);
    }
}
