use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use slicemesh_mesher::{MergeKey, Mesher, SliceScalar};

/// Lock-free pool of reusable meshers shared by worker jobs.
///
/// Meshers are built lazily up to `max_meshers`. Once that many are checked out,
/// `acquire` blocks until a guard is dropped.
pub struct MesherPool<C, A> {
    available_tx: Sender<Mesher<C, A>>,
    available_rx: Receiver<Mesher<C, A>>,
    allocated: AtomicUsize,
    max_meshers: usize,
}

impl<C: SliceScalar, A: MergeKey> MesherPool<C, A> {
    pub fn new(max_meshers: usize) -> Self {
        debug_assert!(max_meshers > 0);
        let (tx, rx) = bounded(max_meshers);
        Self {
            available_tx: tx,
            available_rx: rx,
            allocated: AtomicUsize::new(0),
            max_meshers,
        }
    }

    /// Checks out an idle mesher, building a new one if under capacity.
    pub fn acquire(&self) -> PooledMesher<'_, C, A> {
        if let Ok(mesher) = self.available_rx.try_recv() {
            return self.guard(mesher);
        }

        loop {
            let current = self.allocated.load(Ordering::Acquire);
            if current < self.max_meshers {
                let prev = self.allocated.fetch_add(1, Ordering::AcqRel);
                if prev < self.max_meshers {
                    log::debug!("mesher pool: allocating mesher {}/{}", prev + 1, self.max_meshers);
                    return self.guard(Mesher::new());
                }
                self.allocated.fetch_sub(1, Ordering::AcqRel);
            }

            // The pool holds a sender itself, so this only fails if it is being torn down.
            if let Ok(mesher) = self.available_rx.recv() {
                return self.guard(mesher);
            }
        }
    }

    /// Meshers built so far, idle or checked out.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    pub fn idle(&self) -> usize {
        self.available_rx.len()
    }

    pub fn max_meshers(&self) -> usize {
        self.max_meshers
    }

    fn guard(&self, mesher: Mesher<C, A>) -> PooledMesher<'_, C, A> {
        debug_assert_eq!(mesher.pending_candidates(), 0);
        PooledMesher {
            mesher: Some(mesher),
            pool: self,
        }
    }

    fn release(&self, mut mesher: Mesher<C, A>) {
        mesher.clear();
        let _ = self.available_tx.send(mesher);
    }
}

/// Exclusive handle on a pooled mesher. Dropping it clears the mesher and returns it.
pub struct PooledMesher<'pool, C: SliceScalar, A: MergeKey> {
    mesher: Option<Mesher<C, A>>,
    pool: &'pool MesherPool<C, A>,
}

impl<'pool, C: SliceScalar, A: MergeKey> Deref for PooledMesher<'pool, C, A> {
    type Target = Mesher<C, A>;

    fn deref(&self) -> &Self::Target {
        self.mesher.as_ref().expect("mesher already released")
    }
}

impl<'pool, C: SliceScalar, A: MergeKey> DerefMut for PooledMesher<'pool, C, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mesher.as_mut().expect("mesher already released")
    }
}

impl<'pool, C: SliceScalar, A: MergeKey> Drop for PooledMesher<'pool, C, A> {
    fn drop(&mut self) {
        if let Some(mesher) = self.mesher.take() {
            self.pool.release(mesher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicemesh_mesher::{FaceDirection, GeometryMesher};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    type GeometryPool = MesherPool<u16, ()>;

    #[test]
    fn meshers_are_built_lazily_and_reused() {
        let pool = GeometryPool::new(2);
        assert_eq!(pool.allocated(), 0);
        {
            let _a = pool.acquire();
            assert_eq!(pool.allocated(), 1);
        }
        assert_eq!(pool.idle(), 1);
        let _b = pool.acquire();
        assert_eq!(pool.allocated(), 1);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn returned_meshers_are_cleared() {
        let pool = GeometryPool::new(1);
        {
            let mut m = pool.acquire();
            m.add_quad(FaceDirection::Top, 3, 3, 3);
            assert_eq!(m.pending_candidates(), 1);
        }
        let m = pool.acquire();
        assert_eq!(m.pending_candidates(), 0);
        assert_eq!(m.faces_submitted(), 0);
    }

    #[test]
    fn acquire_blocks_at_capacity() {
        let pool = Arc::new(GeometryPool::new(1));
        let held = pool.acquire();
        let (tx, rx) = bounded::<()>(1);
        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let _m = pool.acquire();
                let _ = tx.send(());
            })
        };
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        drop(held);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        let _ = waiter.join();
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn pooled_mesher_derefs_to_mesher() {
        fn takes_mesher(m: &mut GeometryMesher) -> usize {
            m.add_quad(FaceDirection::Back, 0, 0, 0);
            m.pending_candidates()
        }
        let pool = GeometryPool::new(1);
        let mut m = pool.acquire();
        assert_eq!(takes_mesher(&mut m), 1);
    }
}
