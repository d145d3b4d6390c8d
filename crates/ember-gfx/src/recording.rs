//! A headless backend that records every call it receives.
//!
//! [`RecordingBackend`] is the validation workhorse of the render core:
//! instead of driving a GPU it appends a [`BackendCall`] to a shared log for
//! every operation. Tests (and headless runs) assert on the exact call
//! sequence -- draw order, blend state, handle lifecycle -- without any
//! graphics device.
//!
//! The call log lives behind an `Arc<Mutex<..>>` so it stays inspectable
//! from the submitting thread while the backend itself is owned by a worker
//! thread.
//!
//! Texture dimensions are fabricated (default 256x256, overridable per
//! path), and per-path failure injection makes the non-fatal load-failure
//! paths exercisable.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::backend::{Eye, GraphicsBackend, QuadSubmission};
use crate::draw_list::ExternalDrawList;
use crate::handle::{FontHandle, TextSurface, TextureHandle, TextureMetadata};
use crate::math::Vec2;
use crate::BackendError;

// ---------------------------------------------------------------------------
// BackendCall
// ---------------------------------------------------------------------------

/// One recorded backend operation.
///
/// Failed `create_*` calls are not recorded; the log contains only
/// operations that took effect, which is what resource-lifecycle assertions
/// count.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateTexture {
        path: String,
        handle: TextureHandle,
    },
    CreateFont {
        path: String,
        point_size: u32,
        handle: FontHandle,
    },
    DestroyTexture(TextureHandle),
    DestroyFont(FontHandle),
    BeginFrame {
        eye: Eye,
        viewport: Vec2,
    },
    EndFrame,
    SubmitQuad(QuadSubmission),
    SubmitDrawList {
        ranges: usize,
        indices: usize,
    },
    RasterizeText {
        font: FontHandle,
        text: String,
        surface: TextSurface,
    },
    UploadSurface {
        surface_id: u64,
        handle: TextureHandle,
    },
    DestroySurface(u64),
    Present,
}

/// Shared, thread-safe call log.
pub type CallLog = Arc<Mutex<Vec<BackendCall>>>;

// ---------------------------------------------------------------------------
// RecordingBackend
// ---------------------------------------------------------------------------

/// Headless [`GraphicsBackend`] that records calls instead of drawing.
pub struct RecordingBackend {
    calls: CallLog,
    next_id: u64,
    /// Fabricated texture dimensions per path; default is 256x256.
    texture_sizes: HashMap<String, (u32, u32)>,
    /// Paths whose texture/font creation is forced to fail.
    fail_paths: HashSet<String>,
    /// Point size per live font handle, used for text metrics.
    font_sizes: HashMap<FontHandle, u32>,
}

impl RecordingBackend {
    /// A fresh backend with an empty call log.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: 1,
            texture_sizes: HashMap::new(),
            fail_paths: HashSet::new(),
            font_sizes: HashMap::new(),
        }
    }

    /// Fabricate `width` x `height` metadata for textures created from
    /// `path` (matched on the path's string form).
    pub fn set_texture_size(&mut self, path: &str, width: u32, height: u32) {
        self.texture_sizes.insert(path.to_owned(), (width, height));
    }

    /// Force creation from `path` to fail with a descriptive error.
    pub fn fail_path(&mut self, path: &str) {
        self.fail_paths.insert(path.to_owned());
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Shared handle to the call log, inspectable while the backend is
    /// owned by another thread.
    pub fn log_handle(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    /// Clear the call log (the handle counter keeps advancing).
    pub fn clear_calls(&self) {
        self.calls.lock().expect("call log poisoned").clear();
    }

    /// Number of recorded [`BackendCall::SubmitQuad`] calls.
    pub fn quad_count(&self) -> usize {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .filter(|c| matches!(c, BackendCall::SubmitQuad(_)))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    fn mint(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_texture(&mut self, path: &Path) -> Result<(TextureMetadata, TextureHandle), BackendError> {
        let key = path.to_string_lossy().into_owned();
        if self.fail_paths.contains(&key) {
            return Err(BackendError::TextureCreation {
                path: key,
                details: "injected failure".to_owned(),
            });
        }
        let (width, height) = self.texture_sizes.get(&key).copied().unwrap_or((256, 256));
        let handle = TextureHandle(self.mint());
        self.record(BackendCall::CreateTexture {
            path: key,
            handle,
        });
        Ok((TextureMetadata { width, height }, handle))
    }

    fn create_font(&mut self, path: &Path, point_size: u32) -> Result<FontHandle, BackendError> {
        let key = path.to_string_lossy().into_owned();
        if self.fail_paths.contains(&key) {
            return Err(BackendError::FontCreation {
                path: key,
                point_size,
                details: "injected failure".to_owned(),
            });
        }
        let handle = FontHandle(self.mint());
        self.font_sizes.insert(handle, point_size);
        self.record(BackendCall::CreateFont {
            path: key,
            point_size,
            handle,
        });
        Ok(handle)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.record(BackendCall::DestroyTexture(handle));
    }

    fn destroy_font(&mut self, handle: FontHandle) {
        self.font_sizes.remove(&handle);
        self.record(BackendCall::DestroyFont(handle));
    }

    fn begin_frame(&mut self, eye: &Eye, viewport: Vec2) {
        self.record(BackendCall::BeginFrame {
            eye: *eye,
            viewport,
        });
    }

    fn end_frame(&mut self) {
        self.record(BackendCall::EndFrame);
    }

    fn submit_quad(&mut self, quad: &QuadSubmission) {
        self.record(BackendCall::SubmitQuad(*quad));
    }

    fn submit_draw_list(&mut self, list: &ExternalDrawList) {
        self.record(BackendCall::SubmitDrawList {
            ranges: list.ranges.len(),
            indices: list.indices.len(),
        });
    }

    fn rasterize_text(
        &mut self,
        font: FontHandle,
        text: &str,
        wrap: Option<u32>,
    ) -> Result<TextSurface, BackendError> {
        let point_size = *self.font_sizes.get(&font).ok_or(BackendError::TextRasterization {
            details: format!("unknown font handle {font:?}"),
        })?;

        // Fabricated but deterministic metrics: fixed advance of half the
        // point size per character.
        let advance = (point_size / 2).max(1);
        let chars = text.chars().count().max(1) as u32;
        let (width, height) = match wrap {
            Some(wrap_width) => {
                let per_line = (wrap_width / advance).max(1);
                let lines = chars.div_ceil(per_line);
                (chars.min(per_line) * advance, lines * point_size)
            }
            None => (chars * advance, point_size),
        };

        let surface = TextSurface {
            id: self.mint(),
            width,
            height,
        };
        self.record(BackendCall::RasterizeText {
            font,
            text: text.to_owned(),
            surface,
        });
        Ok(surface)
    }

    fn upload_surface(&mut self, surface: &TextSurface) -> Result<(TextureMetadata, TextureHandle), BackendError> {
        let handle = TextureHandle(self.mint());
        self.record(BackendCall::UploadSurface {
            surface_id: surface.id,
            handle,
        });
        Ok((
            TextureMetadata {
                width: surface.width,
                height: surface.height,
            },
            handle,
        ))
    }

    fn destroy_surface(&mut self, surface: TextSurface) {
        self.record(BackendCall::DestroySurface(surface.id));
    }

    fn present(&mut self) {
        self.record(BackendCall::Present);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_across_kinds() {
        let mut backend = RecordingBackend::new();
        let (_, tex) = backend.create_texture(Path::new("a.png")).expect("create");
        let font = backend.create_font(Path::new("f_12.ttf"), 12).expect("create");
        assert_ne!(tex.0, font.0, "texture and font handles share one id space");
    }

    #[test]
    fn injected_failure_is_not_recorded() {
        let mut backend = RecordingBackend::new();
        backend.fail_path("missing.png");
        let err = backend.create_texture(Path::new("missing.png"));
        assert!(err.is_err(), "injected failure must surface as an error");
        assert!(
            backend.calls().is_empty(),
            "failed creation must not appear in the call log"
        );
    }

    #[test]
    fn rasterize_wrap_bounds_width() {
        let mut backend = RecordingBackend::new();
        let font = backend.create_font(Path::new("f_16.ttf"), 16).expect("create");
        let unwrapped = backend.rasterize_text(font, "hello world", None).expect("raster");
        let wrapped = backend
            .rasterize_text(font, "hello world", Some(32))
            .expect("raster");
        assert!(wrapped.width <= 32, "wrapped surface must respect the wrap width");
        assert!(wrapped.height > unwrapped.height, "wrapping adds lines");
    }
}
