//! Little-endian byte codec for save files

use super::SaveError;

#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Length-prefixed list; lists longer than 255 are truncated
    pub fn write_u8_list(&mut self, values: &[u8]) {
        let n = values.len().min(u8::MAX as usize);
        self.write_u8(n as u8);
        self.buf.extend_from_slice(&values[..n]);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked reader. Every read fails with [`SaveError::Corrupted`]
/// instead of running past the end.
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SaveError> {
        let end = self.offset + N;
        let slice = self.bytes.get(self.offset..end).ok_or(SaveError::Corrupted {
            offset: end,
            len: self.bytes.len(),
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.offset = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, SaveError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, SaveError> {
        Ok(self.read_u8()? == 1)
    }

    pub fn read_u32(&mut self) -> Result<u32, SaveError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, SaveError> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    pub fn read_u8_list(&mut self) -> Result<Vec<u8>, SaveError> {
        let n = self.read_u8()?;
        (0..n).map(|_| self.read_u8()).collect()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }
}
