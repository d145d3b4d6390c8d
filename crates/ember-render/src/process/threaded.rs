//! Producer/consumer renderer process.
//!
//! One dedicated worker thread owns the backend, the asset cache, and the
//! compositor; the calling thread only enqueues, submits, and swaps. The
//! two threads meet at exactly three points, all owned by [`SharedState`]:
//!
//! - a single-slot submission mail slot (overwritten never -- the caller
//!   may not submit again until the worker drains the slot),
//! - the swap-request flag,
//! - the termination flag,
//!
//! plus the lock-guarded message pool. Everything else is thread-confined.
//!
//! The worker busy-waits with `thread::yield_now` instead of blocking on a
//! condition variable: handshake latency is worth more than the burned CPU
//! inside a sub-16ms frame budget.
//!
//! Frame lock-step: the N-th submission is rendered before the N-th swap
//! presents, and before any message of submission N+1 is rendered. The
//! single-slot mail slot enforces this -- `submit_messages` refuses to
//! overwrite an undrained slot with [`ProcessError::FrameInFlight`].

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use ember_gfx::backend::{Eye, GraphicsBackend};
use ember_gfx::math::Vec2;

use crate::assets::AssetGraph;
use crate::compositor::FrameCompositor;
use crate::message::{AssetTag, RenderMessage};
use crate::pool::MessagePool;
use crate::process::{graph_resolves, ProcessConfig, ProcessError, RendererProcess};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// One frame's handoff from caller to worker.
struct Submission {
    messages: Vec<RenderMessage>,
    eye: Eye,
    viewport: Vec2,
}

/// The only state crossing the thread boundary.
struct SharedState {
    /// Single-slot mail slot: `Some` while a submission awaits the worker.
    submission: Mutex<Option<Submission>>,
    /// Raised by `swap`, cleared by the worker when it presents.
    swap_requested: AtomicBool,
    /// Raised by `terminate`, observed at every worker wait point.
    terminate_requested: AtomicBool,
}

// ---------------------------------------------------------------------------
// ThreadedProcess
// ---------------------------------------------------------------------------

/// Renderer process running the compositor on a dedicated worker thread.
///
/// After `start`, the backend and all cache state belong exclusively to the
/// worker; the caller interacts only through the message protocol. On
/// `terminate` the worker finishes any in-flight frame, frees every cached
/// asset, and hands the backend back, so a stopped process can be
/// inspected and restarted.
pub struct ThreadedProcess<B: GraphicsBackend + Send + 'static> {
    shared: Arc<SharedState>,
    graph: Arc<dyn AssetGraph>,
    pool: Arc<MessagePool>,
    queue: Vec<RenderMessage>,
    /// Backend while stopped; moves into the worker on `start`.
    idle_backend: Option<B>,
    worker: Option<JoinHandle<B>>,
}

impl<B: GraphicsBackend + Send + 'static> ThreadedProcess<B> {
    /// A stopped process. Call [`start`](RendererProcess::start) before
    /// enqueueing.
    pub fn new(backend: B, graph: impl AssetGraph + 'static, config: ProcessConfig) -> Self {
        Self {
            shared: Arc::new(SharedState {
                submission: Mutex::new(None),
                swap_requested: AtomicBool::new(false),
                terminate_requested: AtomicBool::new(false),
            }),
            graph: Arc::new(graph),
            pool: Arc::new(MessagePool::new(config.pool_preallocation)),
            queue: Vec::new(),
            idle_backend: Some(backend),
            worker: None,
        }
    }

    /// The `CachedSprite` message pool. Acquire slots here, fill them, and
    /// enqueue them; the worker recycles them after each frame.
    pub fn pool(&self) -> Arc<MessagePool> {
        Arc::clone(&self.pool)
    }

    /// True while the previous submission has not been drained by the
    /// worker. `submit_messages` fails until this clears.
    pub fn submission_pending(&self) -> bool {
        self.shared
            .submission
            .lock()
            .expect("submission slot poisoned")
            .is_some()
    }

    /// The backend, available only while stopped.
    pub fn backend(&self) -> Option<&B> {
        self.idle_backend.as_ref()
    }

    fn running(&self) -> bool {
        self.worker.is_some()
    }
}

impl<B: GraphicsBackend + Send + 'static> RendererProcess for ThreadedProcess<B> {
    fn start(&mut self) -> Result<(), ProcessError> {
        if self.running() {
            return Err(ProcessError::AlreadyStarted);
        }
        let backend = self.idle_backend.take().ok_or(ProcessError::WorkerFailed)?;

        self.shared.swap_requested.store(false, Ordering::Release);
        self.shared.terminate_requested.store(false, Ordering::Release);
        *self
            .shared
            .submission
            .lock()
            .expect("submission slot poisoned") = None;

        let shared = Arc::clone(&self.shared);
        let graph = Arc::clone(&self.graph);
        let pool = Arc::clone(&self.pool);
        let handle = thread::Builder::new()
            .name("ember-render-worker".to_owned())
            .spawn(move || worker_loop(backend, shared, graph, pool))
            .map_err(|e| ProcessError::WorkerSpawn {
                details: e.to_string(),
            })?;
        self.worker = Some(handle);
        Ok(())
    }

    fn enqueue_message(&mut self, message: RenderMessage) -> Result<(), ProcessError> {
        if !self.running() {
            return Err(ProcessError::NotStarted);
        }
        self.queue.push(message);
        Ok(())
    }

    fn clear_messages(&mut self) -> Result<(), ProcessError> {
        if !self.running() {
            return Err(ProcessError::NotStarted);
        }
        self.queue.clear();
        Ok(())
    }

    fn submit_messages(&mut self, eye: Eye, viewport: Vec2) -> Result<(), ProcessError> {
        if !self.running() {
            return Err(ProcessError::NotStarted);
        }
        let mut slot = self
            .shared
            .submission
            .lock()
            .expect("submission slot poisoned");
        if slot.is_some() {
            // Explicit backpressure instead of silent overwrite: callers
            // stay one frame apart by waiting on the previous swap.
            return Err(ProcessError::FrameInFlight);
        }
        // The live enqueue buffer is swapped for a fresh one atomically
        // with respect to this thread; the old buffer rides the mail slot.
        *slot = Some(Submission {
            messages: mem::take(&mut self.queue),
            eye,
            viewport,
        });
        Ok(())
    }

    fn swap(&mut self) -> Result<(), ProcessError> {
        if !self.running() {
            return Err(ProcessError::NotStarted);
        }
        if self.shared.swap_requested.swap(true, Ordering::AcqRel) {
            return Err(ProcessError::RedundantSwap);
        }
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        let Some(worker) = self.worker.take() else {
            return Err(ProcessError::NotStarted);
        };
        self.shared.terminate_requested.store(true, Ordering::Release);
        let backend = worker.join().map_err(|_| ProcessError::WorkerFailed)?;
        self.idle_backend = Some(backend);
        self.queue.clear();
        Ok(())
    }

    fn asset_resolvable(&self, tag: &AssetTag) -> bool {
        graph_resolves(self.graph.as_ref(), tag)
    }
}

impl<B: GraphicsBackend + Send + 'static> Drop for ThreadedProcess<B> {
    /// Dropping a running process stops the worker so the thread never
    /// outlives the handle.
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.shared.terminate_requested.store(true, Ordering::Release);
            let _ = worker.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

/// The worker: wait for a submission, render, recycle, wait for the swap
/// request, present, repeat. Termination is observed at both wait points;
/// a frame in flight finishes first, so termination latency is bounded by
/// one frame.
fn worker_loop<B: GraphicsBackend>(
    mut backend: B,
    shared: Arc<SharedState>,
    graph: Arc<dyn AssetGraph>,
    pool: Arc<MessagePool>,
) -> B {
    let mut compositor = FrameCompositor::new(graph);

    'frames: loop {
        // Wait for a submission.
        let submission = loop {
            if shared.terminate_requested.load(Ordering::Acquire) {
                break 'frames;
            }
            let taken = shared
                .submission
                .lock()
                .expect("submission slot poisoned")
                .take();
            if let Some(submission) = taken {
                break submission;
            }
            thread::yield_now();
        };

        // Render; the compositor recycles pooled messages afterwards.
        compositor.render(
            &mut backend,
            submission.messages,
            &submission.eye,
            submission.viewport,
            Some(&pool),
        );

        // Wait for the swap request.
        loop {
            if shared.terminate_requested.load(Ordering::Acquire) {
                break 'frames;
            }
            if shared.swap_requested.swap(false, Ordering::AcqRel) {
                backend.present();
                break;
            }
            thread::yield_now();
        }
    }

    compositor.shutdown(&mut backend);
    backend
}
