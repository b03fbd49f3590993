//! A thread-safe, reference-counted resource container.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A cloneable handle to a value shared between threads.
///
/// `Shared` wraps an `Arc<RwLock<T>>`: cloning the handle is cheap and the
/// value stays alive as long as any clone does. Chunks are handed to loader
/// workers this way, so an eviction on the main thread can never invalidate
/// a worker that still holds a reference into the chunk.
///
/// # Examples
///
/// ```
/// use voxel_world::core::Shared;
///
/// let counter = Shared::new(0);
/// *counter.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
pub struct Shared<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> Shared<T> {
    /// Wraps `resource` in a new shared handle.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard for the contained value.
    ///
    /// Multiple readers may hold guards concurrently.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Returns an exclusive write guard for the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }
}

impl<T: Send + Sync> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn shared_across_threads() {
        let value = Shared::new(0);
        let clone = value.clone();

        let handle = thread::spawn(move || {
            *clone.get_mut() += 1;
        });
        handle.join().unwrap();

        assert_eq!(*value.get(), 1);
    }
}
