//! Recycling pool for high-volume sprite messages.
//!
//! Per-sprite messages arrive every frame at high volume on the threaded
//! path, so `CachedSprite` messages are recycled through a free list
//! instead of being reallocated each frame: the caller thread acquires and
//! fills slots, the worker thread recycles them after rendering. That is
//! the only mutation crossing the thread boundary, and it is guarded by the
//! pool's lock.
//!
//! Growth is capacity-doubling: the pool preallocates a configured number
//! of messages, and each time the free list runs dry it allocates a batch
//! equal to the current capacity and doubles it.
//!
//! Only `CachedSprite` messages are pooled. Other descriptor kinds are
//! low-frequency (particles, tiles, text) and are allocated normally;
//! [`recycle`](MessagePool::recycle) silently drops them.

use std::sync::Mutex;

use crate::message::{AssetTag, LayeredMessage, RenderDescriptor, SpriteData};

// ---------------------------------------------------------------------------
// MessagePool
// ---------------------------------------------------------------------------

struct PoolInner {
    free: Vec<LayeredMessage>,
    /// Size of the next growth batch; doubles after each exhaustion.
    capacity: usize,
    /// Messages ever allocated by this pool.
    total_allocated: usize,
}

/// Lock-guarded free list of `CachedSprite` messages.
pub struct MessagePool {
    inner: Mutex<PoolInner>,
}

impl MessagePool {
    /// A pool preallocated with `preallocation` messages (at least one).
    pub fn new(preallocation: usize) -> Self {
        let preallocation = preallocation.max(1);
        let free = (0..preallocation).map(|_| fresh_message()).collect();
        Self {
            inner: Mutex::new(PoolInner {
                free,
                capacity: preallocation,
                total_allocated: preallocation,
            }),
        }
    }

    /// Take a recycled `CachedSprite` message, growing the pool if empty.
    ///
    /// The returned message carries whatever payload it had when recycled;
    /// the caller overwrites every field it cares about.
    pub fn acquire(&self) -> LayeredMessage {
        let mut inner = self.inner.lock().expect("message pool lock poisoned");
        if inner.free.is_empty() {
            let batch = inner.capacity;
            tracing::debug!(batch, "message pool exhausted; growing");
            inner.free.extend((0..batch).map(|_| fresh_message()));
            inner.total_allocated += batch;
            inner.capacity *= 2;
        }
        inner.free.pop().expect("pool grew but is still empty")
    }

    /// Return a message to the pool. Non-`CachedSprite` messages are
    /// dropped unpooled.
    pub fn recycle(&self, message: LayeredMessage) {
        if !message.descriptor.is_cached_sprite() {
            return;
        }
        let mut inner = self.inner.lock().expect("message pool lock poisoned");
        inner.free.push(message);
    }

    /// Recycle a whole frame's drained messages.
    pub fn recycle_batch(&self, messages: impl IntoIterator<Item = LayeredMessage>) {
        let mut inner = self.inner.lock().expect("message pool lock poisoned");
        inner
            .free
            .extend(messages.into_iter().filter(|m| m.descriptor.is_cached_sprite()));
    }

    /// Size of the next growth batch.
    pub fn capacity(&self) -> usize {
        self.inner.lock().expect("message pool lock poisoned").capacity
    }

    /// Messages ever allocated by this pool.
    pub fn total_allocated(&self) -> usize {
        self.inner
            .lock()
            .expect("message pool lock poisoned")
            .total_allocated
    }

    /// Messages currently in the free list.
    pub fn available(&self) -> usize {
        self.inner.lock().expect("message pool lock poisoned").free.len()
    }
}

/// A blank pooled message.
fn fresh_message() -> LayeredMessage {
    LayeredMessage::new(
        0.0,
        0.0,
        AssetTag::new("", ""),
        RenderDescriptor::CachedSprite(SpriteData::default()),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preallocation_fills_free_list() {
        let pool = MessagePool::new(8);
        assert_eq!(pool.available(), 8);
        assert_eq!(pool.total_allocated(), 8);
        assert_eq!(pool.capacity(), 8);
    }

    #[test]
    fn exhaustion_doubles_capacity() {
        let pool = MessagePool::new(4);
        let taken: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        assert_eq!(pool.available(), 0);

        // 5th acquire triggers a growth batch of 4; capacity doubles to 8.
        let extra = pool.acquire();
        assert_eq!(pool.total_allocated(), 8);
        assert_eq!(pool.capacity(), 8);

        pool.recycle(extra);
        for msg in taken {
            pool.recycle(msg);
        }
        assert_eq!(pool.available(), 8);
    }

    #[test]
    fn growth_series_is_geometric() {
        let pool = MessagePool::new(2);
        // Drain through three growth cycles: 2, then +2, +4, +8.
        let mut held = Vec::new();
        for _ in 0..16 {
            held.push(pool.acquire());
        }
        assert_eq!(pool.total_allocated(), 16, "2 + 2 + 4 + 8");
        assert_eq!(pool.capacity(), 16);
    }

    #[test]
    fn non_cached_messages_are_not_pooled() {
        let pool = MessagePool::new(1);
        let _ = pool.acquire();
        pool.recycle(LayeredMessage::new(
            0.0,
            0.0,
            AssetTag::new("p", "a"),
            RenderDescriptor::Sprite(SpriteData::default()),
        ));
        assert_eq!(pool.available(), 0, "plain sprites must not enter the free list");
    }
}
