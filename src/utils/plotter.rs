//! Typed writes and reads into flat byte buffers at a tracked cursor.
//!
//! `Plotter` fills a mutable slice, `Scanner` walks an immutable one. Both are
//! generic over `byteorder::ByteOrder` and default to `LittleEndian`, which is
//! what every vertex layout and read-back in this crate uses.

use std::marker::PhantomData;

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::*;

#[inline]
fn reserve(cursor: usize, len: usize, capacity: usize) -> Result<usize> {
    let end = cursor + len;
    if end > capacity {
        return Err(Error::BufferOverflow {
            offset: cursor,
            len,
            capacity,
        });
    }

    Ok(end)
}

pub struct Plotter<'a, B: ByteOrder = LittleEndian> {
    buf: &'a mut [u8],
    cursor: usize,
    _order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Plotter<'a, B> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Plotter {
            buf,
            cursor: 0,
            _order: PhantomData,
        }
    }

    /// The number of bytes written since the last rewind.
    #[inline]
    pub fn offset(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        reserve(0, offset, self.buf.len())?;
        self.cursor = offset;
        Ok(())
    }

    /// Bytes in `[0, offset)`.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    pub fn plot_u8(&mut self, v: u8) -> Result<()> {
        let end = reserve(self.cursor, 1, self.buf.len())?;
        self.buf[self.cursor] = v;
        self.cursor = end;
        Ok(())
    }

    pub fn plot_u16(&mut self, v: u16) -> Result<()> {
        let end = reserve(self.cursor, 2, self.buf.len())?;
        B::write_u16(&mut self.buf[self.cursor..end], v);
        self.cursor = end;
        Ok(())
    }

    pub fn plot_u32(&mut self, v: u32) -> Result<()> {
        let end = reserve(self.cursor, 4, self.buf.len())?;
        B::write_u32(&mut self.buf[self.cursor..end], v);
        self.cursor = end;
        Ok(())
    }

    pub fn plot_f32(&mut self, v: f32) -> Result<()> {
        let end = reserve(self.cursor, 4, self.buf.len())?;
        B::write_f32(&mut self.buf[self.cursor..end], v);
        self.cursor = end;
        Ok(())
    }

    pub fn plot_bytes(&mut self, v: &[u8]) -> Result<()> {
        let end = reserve(self.cursor, v.len(), self.buf.len())?;
        self.buf[self.cursor..end].copy_from_slice(v);
        self.cursor = end;
        Ok(())
    }
}

pub struct Scanner<'a, B: ByteOrder = LittleEndian> {
    buf: &'a [u8],
    cursor: usize,
    _order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Scanner<'a, B> {
    pub fn new(buf: &'a [u8]) -> Self {
        Scanner {
            buf,
            cursor: 0,
            _order: PhantomData,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        reserve(0, offset, self.buf.len())?;
        self.cursor = offset;
        Ok(())
    }

    pub fn scan_u8(&mut self) -> Result<u8> {
        let end = reserve(self.cursor, 1, self.buf.len())?;
        let v = self.buf[self.cursor];
        self.cursor = end;
        Ok(v)
    }

    pub fn scan_u16(&mut self) -> Result<u16> {
        let end = reserve(self.cursor, 2, self.buf.len())?;
        let v = B::read_u16(&self.buf[self.cursor..end]);
        self.cursor = end;
        Ok(v)
    }

    pub fn scan_u32(&mut self) -> Result<u32> {
        let end = reserve(self.cursor, 4, self.buf.len())?;
        let v = B::read_u32(&self.buf[self.cursor..end]);
        self.cursor = end;
        Ok(v)
    }

    pub fn scan_f32(&mut self) -> Result<f32> {
        let end = reserve(self.cursor, 4, self.buf.len())?;
        let v = B::read_f32(&self.buf[self.cursor..end]);
        self.cursor = end;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::BigEndian;
    use rand::Rng;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Value {
        U8(u8),
        U16(u16),
        U32(u32),
        F32(f32),
    }

    fn random_values(n: usize) -> Vec<Value> {
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| match rng.gen_range(0..4) {
                0 => Value::U8(rng.gen()),
                1 => Value::U16(rng.gen()),
                2 => Value::U32(rng.gen()),
                _ => Value::F32(rng.gen_range(-1e6..1e6)),
            })
            .collect()
    }

    fn round_trip<B: ByteOrder>(values: &[Value]) {
        let mut buf = vec![0u8; values.len() * 4];
        {
            let mut plotter = Plotter::<B>::new(&mut buf);
            for v in values {
                match *v {
                    Value::U8(v) => plotter.plot_u8(v).unwrap(),
                    Value::U16(v) => plotter.plot_u16(v).unwrap(),
                    Value::U32(v) => plotter.plot_u32(v).unwrap(),
                    Value::F32(v) => plotter.plot_f32(v).unwrap(),
                }
            }
        }

        let mut scanner = Scanner::<B>::new(&buf);
        for v in values {
            let read = match *v {
                Value::U8(_) => Value::U8(scanner.scan_u8().unwrap()),
                Value::U16(_) => Value::U16(scanner.scan_u16().unwrap()),
                Value::U32(_) => Value::U32(scanner.scan_u32().unwrap()),
                Value::F32(_) => Value::F32(scanner.scan_f32().unwrap()),
            };
            assert_eq!(read, *v);
        }
    }

    #[test]
    fn random_round_trip() {
        for _ in 0..32 {
            let values = random_values(64);
            round_trip::<LittleEndian>(&values);
            round_trip::<BigEndian>(&values);
        }
    }

    #[test]
    fn little_endian_layout() {
        let mut buf = [0u8; 6];
        let mut plotter: Plotter = Plotter::new(&mut buf);
        plotter.plot_u16(0x0102).unwrap();
        plotter.plot_u32(0x0304_0506).unwrap();
        assert_eq!(plotter.offset(), 6);
        assert_eq!(buf, [0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn overflow() {
        let mut buf = [0u8; 5];
        let mut plotter: Plotter = Plotter::new(&mut buf);
        plotter.plot_u32(7).unwrap();
        let err = plotter.plot_u16(1).unwrap_err();
        assert_eq!(
            err,
            Error::BufferOverflow {
                offset: 4,
                len: 2,
                capacity: 5
            }
        );
        assert_eq!(plotter.offset(), 4);

        plotter.rewind();
        assert_eq!(plotter.offset(), 0);
        assert!(plotter.seek(6).is_err());
        plotter.seek(4).unwrap();
        plotter.plot_u8(9).unwrap();
        assert_eq!(buf[4], 9);
    }
}
