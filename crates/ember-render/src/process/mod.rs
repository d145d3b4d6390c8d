//! The renderer process protocol.
//!
//! A renderer process is the public face of the render core: the simulation
//! layer starts it, enqueues messages, submits them once per frame with the
//! eye and viewport, swaps, and eventually terminates it. Two
//! implementations share the contract:
//!
//! - [`InlineProcess`]: every call executes synchronously on the caller's
//!   thread.
//! - [`ThreadedProcess`]: the cache/batcher/compositor run on a dedicated
//!   worker thread behind a submit/swap handshake.
//!
//! Protocol violations (double start, enqueue before start, redundant swap)
//! are programming errors and surface as [`ProcessError`]s rather than
//! being absorbed; environmental failures (missing assets, bad files) never
//! surface here -- they are logged and the frame completes without the
//! affected draws.

mod inline;
mod threaded;

pub use inline::InlineProcess;
pub use threaded::ThreadedProcess;

use ember_gfx::backend::Eye;
use ember_gfx::math::Vec2;

use crate::message::{AssetTag, RenderMessage};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Renderer process protocol violations and worker failures.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// `start` was called on an already-running process.
    #[error("renderer process already started")]
    AlreadyStarted,

    /// An operation that requires a running process was called before
    /// `start` or after `terminate`.
    #[error("renderer process is not running")]
    NotStarted,

    /// `swap` was requested again before the previous swap was consumed.
    #[error("swap already pending")]
    RedundantSwap,

    /// `submit_messages` was called before the worker drained the previous
    /// frame's submission. Callers keep in lock-step by waiting for the
    /// prior swap.
    #[error("previous frame's submission has not been consumed")]
    FrameInFlight,

    /// The worker thread could not be spawned.
    #[error("failed to spawn render worker: {details}")]
    WorkerSpawn { details: String },

    /// The worker thread panicked; the backend is lost.
    #[error("render worker panicked")]
    WorkerFailed,
}

// ---------------------------------------------------------------------------
// ProcessConfig
// ---------------------------------------------------------------------------

/// Configuration shared by both process implementations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProcessConfig {
    /// Initial size of the `CachedSprite` message pool (threaded mode).
    pub pool_preallocation: usize,
}

impl Default for ProcessConfig {
    /// Defaults to a 256-message pool.
    fn default() -> Self {
        Self {
            pool_preallocation: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// RendererProcess
// ---------------------------------------------------------------------------

/// The frame-submission protocol.
///
/// Lifecycle: `start` -> (`enqueue_message`* -> `submit_messages` ->
/// `swap`)* -> `terminate`. A terminated process may be started again.
///
/// For a fixed message sequence and fixed eye/viewport parameters, both
/// implementations produce the same backend call sequence.
pub trait RendererProcess {
    /// Begin accepting messages. Fails if already running.
    fn start(&mut self) -> Result<(), ProcessError>;

    /// Queue one message for the next submission. Fails unless running.
    fn enqueue_message(&mut self, message: RenderMessage) -> Result<(), ProcessError>;

    /// Discard all messages queued but not yet submitted.
    fn clear_messages(&mut self) -> Result<(), ProcessError>;

    /// Hand the queued messages to the compositor for rendering. The queue
    /// is reset to empty as part of this call, so enqueue and submit never
    /// race on the same buffer.
    fn submit_messages(&mut self, eye: Eye, viewport: Vec2) -> Result<(), ProcessError>;

    /// Present the rendered frame.
    fn swap(&mut self) -> Result<(), ProcessError>;

    /// Stop the process and release all cache and backend resources.
    /// Fails if not running.
    fn terminate(&mut self) -> Result<(), ProcessError>;

    /// True if the asset graph can resolve the tag's package to contents
    /// that include the asset. Lets callers branch on asset availability
    /// without touching cache state.
    fn asset_resolvable(&self, tag: &AssetTag) -> bool;
}

/// Shared resolvability check against the asset graph.
pub(crate) fn graph_resolves(graph: &dyn crate::assets::AssetGraph, tag: &AssetTag) -> bool {
    graph
        .resolve_package_contents(&tag.package)
        .map(|contents| contents.iter().any(|(name, _)| *name == tag.asset))
        .unwrap_or(false)
}
