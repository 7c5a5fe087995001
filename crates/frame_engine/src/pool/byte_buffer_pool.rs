//! Thread-safe pool of byte buffers ("droplets")
//!
//! Screenshot pixels are read into droplets on the render thread and may be
//! encoded and released on a worker thread, so unlike the other pools this one
//! is shared behind a single mutex.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Droplets {
    free: Vec<Box<[u8]>>,
    outstanding: usize,
}

/// Pool of fixed-length byte buffers, matched by exact length
#[derive(Debug, Clone)]
pub struct ByteBufferPool {
    droplets: Arc<Mutex<Droplets>>,
    leak_threshold: usize,
}

impl Default for ByteBufferPool {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ByteBufferPool {
    /// Create an empty pool warning when more than `leak_threshold` droplets are handed out
    pub fn new(leak_threshold: usize) -> Self {
        Self {
            droplets: Arc::new(Mutex::new(Droplets::default())),
            leak_threshold,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Droplets> {
        self.droplets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a buffer of exactly `len` bytes, allocating one if none matches
    ///
    /// Recycled droplets keep their previous contents.
    pub fn get_droplet(&self, len: usize) -> Box<[u8]> {
        let mut droplets = self.lock();
        let droplet = match droplets.free.iter().position(|d| d.len() == len) {
            Some(index) => droplets.free.swap_remove(index),
            None => {
                log::trace!("Allocating {len} byte droplet");
                vec![0u8; len].into_boxed_slice()
            }
        };

        droplets.outstanding += 1;
        if droplets.outstanding == self.leak_threshold + 1 {
            log::warn!(
                "More than {} byte buffers are in use; droplets are probably not being released",
                self.leak_threshold
            );
        }
        droplet
    }

    /// Return a buffer to the pool
    pub fn release_droplet(&self, droplet: Box<[u8]>) {
        let mut droplets = self.lock();
        droplets.outstanding = droplets.outstanding.saturating_sub(1);
        droplets.free.push(droplet);
    }

    /// Number of pooled (free) droplets
    pub fn size(&self) -> usize {
        self.lock().free.len()
    }

    /// Number of droplets currently handed out
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_exact_length_matching() {
        let pool = ByteBufferPool::default();
        let small = pool.get_droplet(16);
        let large = pool.get_droplet(64);
        pool.release_droplet(small);
        pool.release_droplet(large);
        assert_eq!(pool.size(), 2);

        let droplet = pool.get_droplet(64);
        assert_eq!(droplet.len(), 64);
        assert_eq!(pool.size(), 1);

        // No best fit: a 32 byte request allocates even though 64 is free
        pool.release_droplet(droplet);
        let other = pool.get_droplet(32);
        assert_eq!(other.len(), 32);
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn test_reuse_keeps_allocation() {
        let pool = ByteBufferPool::default();
        let mut droplet = pool.get_droplet(8);
        droplet[0] = 42;
        let address = droplet.as_ptr();
        pool.release_droplet(droplet);

        let again = pool.get_droplet(8);
        assert_eq!(again.as_ptr(), address);
        assert_eq!(again[0], 42);
    }

    #[test]
    fn test_outstanding_count_past_threshold_is_not_an_error() {
        let pool = ByteBufferPool::new(2);
        let droplets: Vec<_> = (0..5).map(|_| pool.get_droplet(4)).collect();
        assert_eq!(pool.outstanding(), 5);
        for droplet in droplets {
            pool.release_droplet(droplet);
        }
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.size(), 5);
    }

    #[test]
    fn test_release_from_worker_thread() {
        let pool = ByteBufferPool::default();
        let droplet = pool.get_droplet(128);
        let worker_pool = pool.clone();
        thread::spawn(move || worker_pool.release_droplet(droplet))
            .join()
            .unwrap();
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.outstanding(), 0);
    }
}
