use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::error::MeshError;

/// Items that can be reset before going back into a [`Pool`].
pub trait Recycle {
    fn recycle(&mut self);
}

impl<T> Recycle for Vec<T> {
    #[inline]
    fn recycle(&mut self) {
        self.clear();
    }
}

struct Shared<T> {
    available_tx: Sender<T>,
    available_rx: Receiver<T>,
    allocated: AtomicUsize,
    max_items: usize,
    name: &'static str,
}

/// Lock-free bounded pool. Cloning shares the same storage.
pub struct Pool<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Recycle + Default> Pool<T> {
    pub fn new(name: &'static str, max_items: usize) -> Self {
        debug_assert!(max_items > 0);
        let (tx, rx) = bounded(max_items);
        Self {
            shared: Arc::new(Shared {
                available_tx: tx,
                available_rx: rx,
                allocated: AtomicUsize::new(0),
                max_items,
                name,
            }),
        }
    }

    /// Takes an idle item, or allocates one if under capacity.
    pub fn try_acquire(&self) -> Result<Pooled<T>, MeshError> {
        let s = &self.shared;
        if let Ok(item) = s.available_rx.try_recv() {
            return Ok(self.wrap(item));
        }
        let mut current = s.allocated.load(Ordering::Acquire);
        while current < s.max_items {
            match s.allocated.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(self.wrap(T::default())),
                Err(actual) => current = actual,
            }
        }
        // Lost a race with a release; one more look before giving up.
        if let Ok(item) = s.available_rx.try_recv() {
            return Ok(self.wrap(item));
        }
        Err(MeshError::PoolExhausted {
            pool: s.name,
            max: s.max_items,
        })
    }

    #[inline]
    fn wrap(&self, item: T) -> Pooled<T> {
        Pooled {
            item: Some(item),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Pool<T> {
    /// Items handed out and not yet returned.
    pub fn in_use(&self) -> usize {
        let s = &self.shared;
        s.allocated
            .load(Ordering::Acquire)
            .saturating_sub(s.available_rx.len())
    }

    pub fn idle(&self) -> usize {
        self.shared.available_rx.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.max_items
    }
}

/// Pool item that returns itself on drop.
pub struct Pooled<T: Recycle> {
    item: Option<T>,
    shared: Arc<Shared<T>>,
}

impl<T: Recycle> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.item.as_ref().expect("pooled item already released")
    }
}

impl<T: Recycle> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().expect("pooled item already released")
    }
}

impl<T: Recycle> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(mut item) = self.item.take() {
            item.recycle();
            // Capacity equals max_items, so this only fails if the pool is gone.
            let _ = self.shared.available_tx.try_send(item);
        }
    }
}

impl<T: Recycle + std::fmt::Debug> std::fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pooled").field(&self.item).finish()
    }
}
