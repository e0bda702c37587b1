use super::handle::HandleLike;
use super::handle_pool::HandlePool;

/// A named object collection. Every time a handle is created or freed, the
/// attached instance `T` is created or dropped along with it.
pub struct ObjectPool<H: HandleLike, T: Sized> {
    handles: HandlePool<H>,
    entries: Vec<Option<T>>,
}

impl<H: HandleLike, T: Sized> Default for ObjectPool<H, T> {
    fn default() -> Self {
        ObjectPool {
            handles: HandlePool::new(),
            entries: Vec::new(),
        }
    }
}

impl<H: HandleLike, T: Sized> ObjectPool<H, T> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Stores `value` and names it with a fresh handle.
    pub fn create(&mut self, value: T) -> H {
        let handle = self.handles.create();
        let index = handle.index() as usize;

        if index >= self.entries.len() {
            self.entries.push(Some(value));
        } else {
            self.entries[index] = Some(value);
        }

        handle
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        if self.handles.is_alive(handle) {
            self.entries[handle.index() as usize].as_ref()
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if self.handles.is_alive(handle) {
            self.entries[handle.index() as usize].as_mut()
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.handles.is_alive(handle)
    }

    /// Removes the value named by `handle`, returning it if it was alive.
    pub fn free(&mut self, handle: H) -> Option<T> {
        if self.handles.free(handle) {
            self.entries[handle.index() as usize].take()
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates alive handles together with their values, in index order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (H, &'a T)> + 'a {
        let entries = &self.entries;
        self.handles.iter().filter_map(move |h| {
            entries[h.index() as usize].as_ref().map(|v| (h, v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn create_get_free() {
        let mut pool: ObjectPool<Handle, &'static str> = ObjectPool::new();
        let a = pool.create("a");
        let b = pool.create("b");

        assert_eq!(pool.get(a), Some(&"a"));
        assert_eq!(pool.free(a), Some("a"));
        assert_eq!(pool.free(a), None);
        assert_eq!(pool.get(a), None);

        *pool.get_mut(b).unwrap() = "bb";
        let c = pool.create("c");
        assert_eq!(c.index(), a.index());

        let values: Vec<_> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["c", "bb"]);
    }
}
