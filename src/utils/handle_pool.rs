use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use super::handle::{HandleIndex, HandleLike};

/// `HandlePool` hands out handles with recycled indices. Freed indices are reused
/// lowest-first; the version of a slot is odd while it is alive and even otherwise.
pub struct HandlePool<H: HandleLike> {
    versions: Vec<HandleIndex>,
    frees: BinaryHeap<Reverse<HandleIndex>>,
    _phantom: PhantomData<H>,
}

impl<H: HandleLike> Default for HandlePool<H> {
    fn default() -> Self {
        HandlePool {
            versions: Vec::new(),
            frees: BinaryHeap::new(),
            _phantom: PhantomData,
        }
    }
}

impl<H: HandleLike> HandlePool<H> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an unused handle.
    pub fn create(&mut self) -> H {
        if let Some(Reverse(index)) = self.frees.pop() {
            let version = &mut self.versions[index as usize];
            *version += 1;
            H::new(index, *version)
        } else {
            self.versions.push(1);
            H::new(self.versions.len() as HandleIndex - 1, 1)
        }
    }

    /// Returns true if `handle` was created by this pool and has not been freed yet.
    #[inline]
    pub fn is_alive(&self, handle: H) -> bool {
        match self.versions.get(handle.index() as usize) {
            Some(&v) => v & 0x1 == 1 && v == handle.version(),
            None => false,
        }
    }

    /// Recycles the index of `handle`. Returns false if it was not alive.
    pub fn free(&mut self, handle: H) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        self.versions[handle.index() as usize] += 1;
        self.frees.push(Reverse(handle.index()));
        true
    }

    /// Returns the number of alive handles.
    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len() - self.frees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the alive handles in index order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = H> + 'a {
        self.versions
            .iter()
            .enumerate()
            .filter(|(_, &v)| v & 0x1 == 1)
            .map(|(i, &v)| H::new(i as HandleIndex, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn recycles_lowest_index_first() {
        let mut pool: HandlePool<Handle> = HandlePool::new();
        let h0 = pool.create();
        let h1 = pool.create();
        let h2 = pool.create();
        assert_eq!(pool.len(), 3);

        assert!(pool.free(h2));
        assert!(pool.free(h0));
        assert!(!pool.free(h0));
        assert_eq!(pool.len(), 1);

        let h3 = pool.create();
        assert_eq!(h3.index(), 0);
        assert_eq!(h3.version(), 3);
        assert!(!pool.is_alive(h0));
        assert!(pool.is_alive(h1));
        assert!(pool.is_alive(h3));

        let alive: Vec<_> = pool.iter().collect();
        assert_eq!(alive, vec![h3, h1]);
    }

    #[test]
    fn nil_is_never_alive() {
        let mut pool: HandlePool<Handle> = HandlePool::new();
        pool.create();
        assert!(!pool.is_alive(Handle::nil()));
    }
}
