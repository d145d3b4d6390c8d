//! Ember GFX -- the graphics boundary of the Ember 2D render core.
//!
//! This crate defines everything the render core needs from a graphics
//! backend without committing to a concrete graphics API: small math value
//! types, colors and blend state, opaque resource handles, immediate-mode
//! overlay draw lists, and the [`GraphicsBackend`](backend::GraphicsBackend)
//! capability trait.
//!
//! It also ships [`RecordingBackend`](recording::RecordingBackend), a
//! headless implementation that records every call it receives. The render
//! core is validated against the recorded call sequence, so correctness
//! tests never need a GPU.
//!
//! # Quick Start
//!
//! ```
//! use ember_gfx::prelude::*;
//!
//! let mut backend = RecordingBackend::new();
//! let eye = Eye::centered(Vec2::new(0.0, 0.0), Vec2::new(800.0, 600.0));
//! backend.begin_frame(&eye, Vec2::new(800.0, 600.0));
//! backend.end_frame();
//! backend.present();
//!
//! let calls = backend.calls();
//! assert_eq!(calls.len(), 3);
//! ```

#![deny(unsafe_code)]

pub mod backend;
pub mod blend;
pub mod color;
pub mod draw_list;
pub mod handle;
pub mod math;
pub mod recording;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by a graphics backend.
///
/// Backend failures are environmental (bad file, out of GPU memory, driver
/// rejection), never programming errors; callers are expected to log them
/// and continue.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Texture creation from a file path failed.
    #[error("texture creation failed for '{path}': {details}")]
    TextureCreation { path: String, details: String },

    /// Font creation from a file path failed.
    #[error("font creation failed for '{path}' at {point_size}pt: {details}")]
    FontCreation {
        path: String,
        point_size: u32,
        details: String,
    },

    /// Rasterizing a text run to a surface failed.
    #[error("text rasterization failed: {details}")]
    TextRasterization { details: String },

    /// Uploading a rasterized surface as a one-shot texture failed.
    #[error("surface upload failed: {details}")]
    SurfaceUpload { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::backend::{Eye, GraphicsBackend, QuadSubmission};
    pub use crate::blend::{BlendEquation, BlendFactor, BlendMode, BlendTriple};
    pub use crate::color::Color;
    pub use crate::draw_list::{DrawRange, DrawVertex, ExternalDrawList};
    pub use crate::handle::{FontHandle, TextSurface, TextureHandle, TextureMetadata};
    pub use crate::math::{Rect, Vec2};
    pub use crate::recording::{BackendCall, RecordingBackend};
    pub use crate::BackendError;
}
