//! Ember Render -- the 2D render core.
//!
//! This crate consumes a per-frame stream of abstract render messages
//! (sprites, particle batches, tile layers, text, overlay draw lists,
//! callbacks) produced by a simulation layer and turns them into ordered
//! calls on a [`GraphicsBackend`](ember_gfx::backend::GraphicsBackend),
//! while managing the lifecycle of backend-bound assets loaded from named
//! packages.
//!
//! The public entry point is the [`RendererProcess`](process::RendererProcess)
//! protocol with two implementations:
//!
//! - [`InlineProcess`](process::InlineProcess): everything runs
//!   synchronously on the caller's thread.
//! - [`ThreadedProcess`](process::ThreadedProcess): the cache, batcher, and
//!   compositor run on a dedicated worker thread, decoupled from the caller
//!   by a submit/swap handshake and a message-recycling pool.
//!
//! Both implementations produce the identical backend call sequence for the
//! same message stream.
//!
//! # Quick Start
//!
//! ```
//! use ember_gfx::prelude::*;
//! use ember_render::prelude::*;
//!
//! let graph = StaticAssetGraph::new();
//! let backend = RecordingBackend::new();
//! let mut process = InlineProcess::new(backend, graph);
//!
//! process.start().expect("start");
//! process
//!     .submit_messages(
//!         Eye::centered(Vec2::ZERO, Vec2::new(800.0, 600.0)),
//!         Vec2::new(800.0, 600.0),
//!     )
//!     .expect("submit");
//! process.swap().expect("swap");
//! process.terminate().expect("terminate");
//! ```

#![deny(unsafe_code)]

pub mod assets;
pub mod batch;
pub mod compositor;
pub mod message;
pub mod pool;
pub mod process;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the graphics boundary crate for convenience.
pub use ember_gfx;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::assets::{
        AssetCache, AssetError, AssetGraph, Package, RenderAsset, StaticAssetGraph,
    };
    pub use crate::compositor::FrameCompositor;
    pub use crate::message::{
        AssetTag, Flip, HorizontalAlign, Justification, LayeredMessage, ParticleData,
        RenderCallback, RenderDescriptor, RenderMessage, SpriteData, TextData, TileLayerData,
        TilesetRef, VerticalAlign,
    };
    pub use crate::pool::MessagePool;
    pub use crate::process::{
        InlineProcess, ProcessConfig, ProcessError, RendererProcess, ThreadedProcess,
    };
}
