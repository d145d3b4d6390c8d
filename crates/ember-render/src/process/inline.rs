//! Synchronous renderer process.

use std::mem;
use std::sync::Arc;

use ember_gfx::backend::{Eye, GraphicsBackend};
use ember_gfx::math::Vec2;

use crate::assets::AssetGraph;
use crate::compositor::FrameCompositor;
use crate::message::{AssetTag, RenderMessage};
use crate::process::{graph_resolves, ProcessError, RendererProcess};

/// Renderer process that executes everything on the caller's thread.
///
/// `submit_messages` invokes the compositor directly and blocks until the
/// frame is dispatched; `swap` presents immediately. There is no message
/// pool -- without a second thread there is nothing to recycle across.
pub struct InlineProcess<B: GraphicsBackend> {
    backend: B,
    graph: Arc<dyn AssetGraph>,
    queue: Vec<RenderMessage>,
    /// `Some` while running; rebuilt on every `start`.
    compositor: Option<FrameCompositor>,
}

impl<B: GraphicsBackend> InlineProcess<B> {
    /// A stopped process. Call [`start`](RendererProcess::start) before
    /// enqueueing.
    pub fn new(backend: B, graph: impl AssetGraph + 'static) -> Self {
        Self {
            backend,
            graph: Arc::new(graph),
            queue: Vec::new(),
            compositor: None,
        }
    }

    /// The backend, for inspection.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access (e.g. to configure a recording backend).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn running(&self) -> bool {
        self.compositor.is_some()
    }
}

impl<B: GraphicsBackend> RendererProcess for InlineProcess<B> {
    fn start(&mut self) -> Result<(), ProcessError> {
        if self.running() {
            return Err(ProcessError::AlreadyStarted);
        }
        self.compositor = Some(FrameCompositor::new(Arc::clone(&self.graph)));
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
        let Some(compositor) = self.compositor.as_mut() else {
            return Err(ProcessError::NotStarted);
        };
        let messages = mem::take(&mut self.queue);
        compositor.render(&mut self.backend, messages, &eye, viewport, None);
        Ok(())
    }

    fn swap(&mut self) -> Result<(), ProcessError> {
        if !self.running() {
            return Err(ProcessError::NotStarted);
        }
        // Synchronous present; safe to call once per frame without a
        // pending-swap handshake.
        self.backend.present();
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        let Some(mut compositor) = self.compositor.take() else {
            return Err(ProcessError::NotStarted);
        };
        compositor.shutdown(&mut self.backend);
        self.queue.clear();
        Ok(())
    }

    fn asset_resolvable(&self, tag: &AssetTag) -> bool {
        graph_resolves(self.graph.as_ref(), tag)
    }
}
