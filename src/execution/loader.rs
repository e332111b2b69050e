//! Asynchronous image loading.
//!
//! Decoding runs on the rayon pool. Each load delivers exactly one message,
//! either the decoded image or the decode error, on its own completion
//! channel. The caller waits on that channel before handing the image to the
//! pipeline.

use crate::core::error::{PipelineError, PipelineResult};
use crate::core::types::SourceImage;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Spawns image decodes in the background.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl ImageLoader {
    /// Decode `bytes` in the background.
    pub fn spawn(bytes: Vec<u8>) -> LoadHandle {
        Self::spawn_with(move || SourceImage::decode(&bytes))
    }

    /// Read and decode the file at `path` in the background.
    pub fn load_path(path: impl Into<PathBuf>) -> LoadHandle {
        let path = path.into();
        Self::spawn_with(move || {
            let bytes = std::fs::read(&path)?;
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            SourceImage::decode(&bytes)
        })
    }

    fn spawn_with<F>(job: F) -> LoadHandle
    where
        F: FnOnce() -> PipelineResult<SourceImage> + Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);

        rayon::spawn(move || {
            let start = Instant::now();
            let result = job();
            match &result {
                Ok(image) => info!(
                    "Decoded {}x{} {:?} image in {}ms",
                    image.width(),
                    image.height(),
                    image.metadata.format,
                    start.elapsed().as_millis()
                ),
                Err(e) => warn!("Image load failed: {}", e),
            }
            // The receiver may have been dropped; the result is then abandoned.
            let _ = tx.send(result);
        });

        LoadHandle { rx }
    }
}

/// Completion channel of one background load.
#[derive(Debug)]
pub struct LoadHandle {
    rx: Receiver<PipelineResult<SourceImage>>,
}

impl LoadHandle {
    /// Block until the load finishes.
    pub fn recv(self) -> PipelineResult<SourceImage> {
        self.rx.recv().unwrap_or_else(|_| Err(worker_gone()))
    }

    /// Block for at most `timeout`. Returns the handle back if still pending.
    pub fn recv_timeout(self, timeout: Duration) -> Result<PipelineResult<SourceImage>, LoadHandle> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Ok(result),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(worker_gone())),
        }
    }

    /// Non-blocking poll.
    pub fn try_recv(&self) -> Option<PipelineResult<SourceImage>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_gone())),
        }
    }
}

fn worker_gone() -> PipelineError {
    PipelineError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "image loader stopped before delivering a result",
    ))
}
