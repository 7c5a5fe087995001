//! Recycling pool for short-lived scheduler objects

/// Objects that can be reset and handed out again
pub trait Poolable {
    /// Clear per-use state before the object goes back into its pool
    fn reset(&mut self);
}

/// Outstanding objects above which a pool suspects a leak
pub const DEFAULT_LEAK_THRESHOLD: usize = 10;

/// Free-list pool with ownership transfer
///
/// `allocate` moves an object out of the pool and `deallocate` moves it back,
/// so a released object cannot be used or released again by the caller.
///
/// The pool never refuses an allocation. Two diagnostics are logged instead:
/// a warning each time more than `leak_threshold` objects are handed out at
/// once, and a warning the first time the pool grows past its nominal
/// capacity.
pub struct ObjectPool<T> {
    name: &'static str,
    free: Vec<T>,
    capacity: usize,
    created: usize,
    leak_threshold: usize,
    factory: Box<dyn Fn() -> T>,
}

impl<T: Poolable> ObjectPool<T> {
    /// Create an empty pool constructing new objects with `factory`
    ///
    /// # Arguments
    /// * `name` - Label used in log messages
    /// * `capacity` - Nominal number of instances; the pool grows past it when needed
    /// * `factory` - Builds a fresh instance when no recycled one is free
    pub fn new(name: &'static str, capacity: usize, factory: impl Fn() -> T + 'static) -> Self {
        Self {
            name,
            free: Vec::with_capacity(capacity),
            capacity,
            created: 0,
            leak_threshold: DEFAULT_LEAK_THRESHOLD,
            factory: Box::new(factory),
        }
    }

    /// Builder pattern: warn when more than `threshold` objects are outstanding
    pub fn with_leak_threshold(mut self, threshold: usize) -> Self {
        self.leak_threshold = threshold;
        self
    }

    /// Take a recycled object, or construct one if none is free
    pub fn allocate(&mut self) -> T {
        let object = self.take();
        if self.outstanding() == self.leak_threshold + 1 {
            log::warn!(
                "{} pool has {} instances outstanding; possible leak",
                self.name,
                self.outstanding()
            );
        }
        object
    }

    fn take(&mut self) -> T {
        if let Some(object) = self.free.pop() {
            return object;
        }

        self.created += 1;
        if self.created == self.capacity + 1 {
            log::warn!(
                "{} pool grew past its capacity of {} instances; objects may not be returned",
                self.name,
                self.capacity
            );
        } else if self.created > self.capacity {
            log::debug!("{} pool grew to {} instances", self.name, self.created);
        }
        (self.factory)()
    }

    /// Reset an object and keep it for reuse
    pub fn deallocate(&mut self, mut object: T) {
        object.reset();
        self.free.push(object);
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Nominal capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Objects ready to be handed out
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Objects constructed by this pool so far
    pub fn created(&self) -> usize {
        self.created
    }

    /// Objects constructed by this pool that are currently handed out
    pub fn outstanding(&self) -> usize {
        self.created.saturating_sub(self.free.len())
    }

    /// Outstanding objects tolerated before a leak warning
    pub fn leak_threshold(&self) -> usize {
        self.leak_threshold
    }

    /// Whether more objects are handed out than the leak threshold allows
    pub fn leak_suspected(&self) -> bool {
        self.outstanding() > self.leak_threshold
    }
}

impl<T: Poolable + Default + 'static> ObjectPool<T> {
    /// Pool constructing objects with `T::default()`
    pub fn with_default(name: &'static str, capacity: usize) -> Self {
        Self::new(name, capacity, T::default)
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("name", &self.name)
            .field("available", &self.free.len())
            .field("capacity", &self.capacity)
            .field("created", &self.created)
            .field("leak_threshold", &self.leak_threshold)
            .finish_non_exhaustive()
    }
}
