use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::assets::decode::{FrameImage, decode_frame};
use crate::assets::source::FrameSource;
use crate::assets::template::FramePathTemplate;
use crate::foundation::core::{FrameCount, FrameIndex};
use crate::foundation::error::ScrubResult;
use crate::lifecycle::pool::{build_thread_pool, shared_decode_pool};

/// Outcome of one frame load, delivered in completion order.
#[derive(Debug)]
pub struct FrameLoaded {
    /// Sequence index of the frame.
    pub index: FrameIndex,
    /// Decoded frame or the reason it is missing.
    pub outcome: ScrubResult<FrameImage>,
}

/// Options for [`Preload::spawn`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PreloadOpts {
    /// Dedicated decode pool size. `None` uses the shared pool.
    pub threads: Option<usize>,
}

enum DecodePool {
    Shared(&'static rayon::ThreadPool),
    Owned(rayon::ThreadPool),
}

impl DecodePool {
    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match self {
            Self::Shared(p) => p.install(op),
            Self::Owned(p) => p.install(op),
        }
    }
}

/// In-flight load of a whole frame sequence.
///
/// Every frame is fetched and decoded independently on a rayon pool; outcomes stream back over a
/// channel as they settle, and the consumer treats "all `N` received" as the join barrier. Loads
/// never block the caller's thread.
///
/// Cancelling (explicitly or by dropping the handle) stops frames that have not started yet and
/// disconnects the channel, so late outcomes are discarded by the worker instead of delivered.
pub struct Preload {
    rx: mpsc::Receiver<FrameLoaded>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Preload {
    /// Start loading `count` frames named by `template` from `source`.
    #[tracing::instrument(skip(source, template), fields(count = count.get()))]
    pub fn spawn(
        source: Arc<dyn FrameSource>,
        template: &FramePathTemplate,
        count: FrameCount,
        opts: PreloadOpts,
    ) -> ScrubResult<Self> {
        let pool = match opts.threads {
            Some(n) => DecodePool::Owned(build_thread_pool(Some(n))?),
            None => DecodePool::Shared(shared_decode_pool()?),
        };

        let paths = template.paths(count);
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_worker = Arc::clone(&cancel);

        let worker = std::thread::Builder::new()
            .name("scrubreel-preload".to_string())
            .spawn(move || {
                pool.install(move || {
                    paths
                        .par_iter()
                        .enumerate()
                        .for_each_with(tx, |tx, (i, path)| {
                            if cancel_worker.load(Ordering::Acquire) {
                                return;
                            }
                            let outcome = source.fetch(path).and_then(|bytes| decode_frame(&bytes));
                            if cancel_worker.load(Ordering::Acquire) {
                                return;
                            }
                            // A closed channel means the consumer is gone; the outcome is dropped.
                            let _ = tx.send(FrameLoaded {
                                index: FrameIndex(i as u32),
                                outcome,
                            });
                        });
                });
                tracing::debug!("preload worker finished");
            })
            .context("spawn preload thread")?;

        Ok(Self {
            rx,
            cancel,
            worker: Some(worker),
        })
    }

    /// Next settled frame, if one is available right now.
    pub fn try_next(&self) -> Option<FrameLoaded> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next settled frame.
    ///
    /// Returns `None` on timeout, and also once every outcome has been delivered.
    pub fn next_timeout(&self, timeout: Duration) -> Option<FrameLoaded> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Stop loading frames that have not started yet.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// `true` after [`Preload::cancel`] or drop.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|w| w.is_finished())
    }
}

impl Drop for Preload {
    fn drop(&mut self) {
        self.cancel();
        // The worker is detached; it exits after its in-flight fetches return.
        drop(self.worker.take());
    }
}

impl std::fmt::Debug for Preload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preload")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/preload.rs"]
mod tests;
