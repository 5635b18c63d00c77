//! Minimal BCS writer
//!
//! Move chains (Aptos, Sui) serialize with BCS: little-endian fixed-width
//! integers, one-byte bools, fixed arrays inline and ULEB128-prefixed
//! sequences. Reading goes through [`Cursor`](super::Cursor).

use alloy_primitives::U256;

#[derive(Debug, Default, Clone)]
pub(crate) struct BcsWriter {
    buf: Vec<u8>,
}

impl BcsWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub(crate) fn bool(&mut self, value: bool) -> &mut Self {
        self.u8(u8::from(value))
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn u256(&mut self, value: U256) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes::<32>());
        self
    }

    /// Fixed-size array, written inline with no length prefix.
    pub(crate) fn fixed(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Sequence length as ULEB128.
    pub(crate) fn seq_len(&mut self, mut len: usize) -> &mut Self {
        loop {
            let byte = (len & 0x7f) as u8;
            len >>= 7;
            if len == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// `vector<u8>`
    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.seq_len(bytes.len()).fixed(bytes)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
