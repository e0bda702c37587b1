use crate::errors::*;
use crate::utils::handle::HandleLike;

/// Backend-side storage indexed by the handles of the front-end pools.
#[derive(Debug)]
pub struct DataVec<T> {
    buf: Vec<Option<T>>,
    versions: Vec<u32>,
}

impl<T> Default for DataVec<T> {
    fn default() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }
}

impl<T> DataVec<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get<H: HandleLike>(&self, handle: H) -> Option<&T> {
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].as_ref(),
            _ => None,
        }
    }

    pub fn get_mut<H: HandleLike>(&mut self, handle: H) -> Option<&mut T> {
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].as_mut(),
            _ => None,
        }
    }

    /// Stores `value` at the slot of `handle`. The slot must be vacant.
    pub fn create<H: HandleLike>(&mut self, handle: H, value: T) -> Result<()> {
        let index = handle.index() as usize;
        if self.buf.len() <= index {
            self.buf.resize_with(index + 1, || None);
            self.versions.resize(index + 1, 0);
        }

        if self.buf[index].is_some() {
            return Err(Invariant::ResourceAlreadyAllocated.into());
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
        Ok(())
    }

    pub fn free<H: HandleLike>(&mut self, handle: H) -> Result<T> {
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index]
                .take()
                .ok_or_else(|| Invariant::ResourceAlreadyReleased.into()),
            _ => Err(Invariant::ResourceAlreadyReleased.into()),
        }
    }

    pub fn get_or_released<H: HandleLike>(&self, handle: H) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| Invariant::ResourceReleased.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn occupied_slot() {
        let mut v = DataVec::new();
        v.create(Handle::new(2, 1), "a").unwrap();
        let err = v.create(Handle::new(2, 3), "b").unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::ResourceAlreadyAllocated));

        assert_eq!(v.get(Handle::new(2, 1)), Some(&"a"));
        assert_eq!(v.free(Handle::new(2, 1)).unwrap(), "a");
        assert!(v.free(Handle::new(2, 1)).is_err());
        v.create(Handle::new(2, 3), "b").unwrap();
        assert_eq!(v.get(Handle::new(2, 1)), None);
    }
}
