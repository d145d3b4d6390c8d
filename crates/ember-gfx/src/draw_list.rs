//! Immediate-mode overlay draw lists.
//!
//! External overlays (debug UI, editor gizmos) build their own vertex and
//! index buffers each frame and hand them to the renderer as an opaque
//! pass-through. The render core does not inspect or reorder the list; the
//! backend binds the per-range texture, applies the scissor, and issues the
//! indexed draws.

use crate::color::Color;
use crate::handle::TextureHandle;
use crate::math::{Rect, Vec2};

/// One vertex of an overlay draw list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawVertex {
    /// Position in viewport pixels.
    pub position: Vec2,
    /// Texture coordinate.
    pub uv: Vec2,
    /// Vertex color, multiplied with the sampled texel.
    pub color: Color,
}

/// A contiguous run of indices drawn with one texture and scissor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRange {
    /// Texture bound for this range.
    pub texture: TextureHandle,
    /// First index of the range.
    pub index_offset: u32,
    /// Number of indices in the range.
    pub index_count: u32,
    /// Scissor rectangle in viewport pixels.
    pub scissor: Rect,
}

/// A complete overlay draw list: shared buffers plus draw ranges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalDrawList {
    pub vertices: Vec<DrawVertex>,
    pub indices: Vec<u32>,
    pub ranges: Vec<DrawRange>,
}

impl ExternalDrawList {
    /// An empty draw list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of indexed triangles across all ranges.
    pub fn triangle_count(&self) -> usize {
        self.ranges.iter().map(|r| r.index_count as usize).sum::<usize>() / 3
    }
}
