//! The graphics backend capability trait.
//!
//! The render core is written against this trait, never against a concrete
//! graphics API. A backend is anything that can create and destroy textures
//! and fonts, rasterize text to a one-shot surface, and draw textured quads
//! and overlay draw lists between `begin_frame`/`end_frame` brackets.
//!
//! The backend owns no policy: draw order, blend selection, culling, and
//! resource lifetimes are all decided by the render core. The backend's only
//! obligations are the per-method contracts below, in particular the full
//! pipeline state save/restore around [`submit_draw_list`](GraphicsBackend::submit_draw_list).

use std::path::Path;

use crate::blend::BlendTriple;
use crate::color::Color;
use crate::draw_list::ExternalDrawList;
use crate::handle::{FontHandle, TextSurface, TextureHandle, TextureMetadata};
use crate::math::{Rect, Vec2};
use crate::BackendError;

// ---------------------------------------------------------------------------
// Eye
// ---------------------------------------------------------------------------

/// The camera for one frame: a center point and a full extent, both in
/// world units.
///
/// Passed to [`GraphicsBackend::begin_frame`] so the backend can build its
/// view-projection, and to render callbacks that need the current view.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Eye {
    /// World-space center of the visible area.
    pub center: Vec2,
    /// Full visible extent in world units.
    pub extent: Vec2,
}

impl Eye {
    /// Construct an eye from its center and full extent.
    pub const fn centered(center: Vec2, extent: Vec2) -> Self {
        Self { center, extent }
    }

    /// The visible area as a world-space rectangle.
    pub fn world_rect(&self) -> Rect {
        Rect::from_center(self.center, self.extent)
    }

    /// The minimum (lower-left) corner of the visible area.
    pub fn min_corner(&self) -> Vec2 {
        self.center - self.extent / 2.0
    }
}

// ---------------------------------------------------------------------------
// QuadSubmission
// ---------------------------------------------------------------------------

/// One textured quad, fully resolved for the backend.
///
/// Position is the quad's pivot location in world units; `pivot` is the
/// normalized pivot point within the quad (`(0.5, 0.5)` is centered).
/// The UV rectangle may carry a negative height to express a Y-flipped
/// texture read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadSubmission {
    pub position: Vec2,
    pub size: Vec2,
    pub pivot: Vec2,
    pub rotation: f32,
    pub uv: Rect,
    pub color: Color,
    pub blend: BlendTriple,
    pub texture: TextureHandle,
}

// ---------------------------------------------------------------------------
// GraphicsBackend
// ---------------------------------------------------------------------------

/// Capability set the render core requires from a graphics API binding.
///
/// # Contracts
///
/// - Every handle minted by a `create_*`/`upload_*` method must be passed to
///   the matching `destroy_*` exactly once; the render core guarantees it
///   never destroys a handle twice or uses one after destruction.
/// - `submit_quad` and `submit_draw_list` are only called between
///   `begin_frame` and `end_frame`.
/// - `submit_draw_list` must save all pipeline state it touches (blend,
///   cull, depth, scissor, bound texture) and restore it before returning,
///   so overlay drawing is side-effect-free on the surrounding quad stream.
/// - `present` flips the completed frame to the screen and may be called at
///   most once per `begin_frame`/`end_frame` bracket.
pub trait GraphicsBackend {
    /// Load a texture from disk and return its metadata and handle.
    fn create_texture(&mut self, path: &Path) -> Result<(TextureMetadata, TextureHandle), BackendError>;

    /// Load a font from disk at a fixed point size.
    fn create_font(&mut self, path: &Path, point_size: u32) -> Result<FontHandle, BackendError>;

    /// Destroy a texture handle.
    fn destroy_texture(&mut self, handle: TextureHandle);

    /// Destroy a font handle.
    fn destroy_font(&mut self, handle: FontHandle);

    /// Begin a frame: set up the view for `eye` and the given viewport size
    /// in pixels, and clear the target.
    fn begin_frame(&mut self, eye: &Eye, viewport: Vec2);

    /// End the current frame. All draws for the frame are submitted.
    fn end_frame(&mut self);

    /// Draw one textured quad.
    fn submit_quad(&mut self, quad: &QuadSubmission);

    /// Draw an overlay draw list. Pipeline state must be restored on return.
    fn submit_draw_list(&mut self, list: &ExternalDrawList);

    /// Rasterize a text run with the given font to a one-shot surface.
    ///
    /// `wrap` bounds the line width in pixels; `None` lays the text out on
    /// a single unbounded line.
    fn rasterize_text(
        &mut self,
        font: FontHandle,
        text: &str,
        wrap: Option<u32>,
    ) -> Result<TextSurface, BackendError>;

    /// Upload a rasterized surface as a one-shot texture.
    fn upload_surface(&mut self, surface: &TextSurface) -> Result<(TextureMetadata, TextureHandle), BackendError>;

    /// Destroy a one-shot text surface.
    fn destroy_surface(&mut self, surface: TextSurface);

    /// Present the completed frame.
    fn present(&mut self);
}
