use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` is how chunks, the world and the player state are shared between
/// the background chunk builder, gameplay code and the renderer. Every chunk lives
/// in its own `MtResource`, so the write guard is the per-chunk critical section:
/// the builder holds it while it rebuilds a chunk's mesh, and a renderer holding a
/// read guard can never observe a half-rebuilt chunk.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use voxel_terrain::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
/// - `try_get()` never blocks, which suits a render path that would rather skip a
///   chunk for one frame than stall on the builder
pub struct MtResource<T: Send + Sync> {
    /// The shared, locked value
    pub resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned, i.e. a thread panicked while holding the
    /// write guard.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Returns a mutable guard that allows modifying the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }

    /// Attempts to take a read guard without blocking.
    ///
    /// # Returns
    /// - `Some(guard)` if no writer currently holds the lock
    /// - `None` if the resource is being written to
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn try_get(&self) -> Option<RwLockReadGuard<'_, T>> {
        match self.resource.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(err)) => panic!("{err}"),
        }
    }

    /// Returns `true` if both handles point at the same underlying resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + Default + 'static> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_get_fails_while_written() {
        let resource = MtResource::new(5);
        let guard = resource.get_mut();
        assert!(resource.try_get().is_none());
        drop(guard);
        assert_eq!(*resource.try_get().unwrap(), 5);
    }

    #[test]
    fn clones_share_the_same_resource() {
        let a = MtResource::new(String::from("chunk"));
        let b = a.clone();
        let c = MtResource::new(String::from("chunk"));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
