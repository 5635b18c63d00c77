//! Bounds-checked reader over a byte buffer
//!
//! Every read advances an explicit cursor and fails with a [`DecodeFault`]
//! instead of panicking, so callers can attach the field they were reading and
//! check that length-prefixed sub-structures were consumed exactly.

use alloy_primitives::{B256, U256};

use crate::error::{CcipError, DecodeFault, MessageField};

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeFault> {
        if n > self.remaining() {
            return Err(DecodeFault::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeFault> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeFault> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u16_be(&mut self) -> Result<u16, DecodeFault> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub(crate) fn read_u32_be(&mut self) -> Result<u32, DecodeFault> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub(crate) fn read_u64_be(&mut self) -> Result<u64, DecodeFault> {
        self.read_array().map(u64::from_be_bytes)
    }

    pub(crate) fn read_u256_be(&mut self) -> Result<U256, DecodeFault> {
        self.read_array::<32>().map(U256::from_be_bytes)
    }

    pub(crate) fn read_b256(&mut self) -> Result<B256, DecodeFault> {
        self.read_array::<32>().map(B256::from)
    }

    /// `len:u8 | bytes[len]`
    pub(crate) fn read_u8_prefixed(&mut self) -> Result<&'a [u8], DecodeFault> {
        let len = self.read_u8()? as usize;
        self.take(len)
    }

    /// `len:u16 (big-endian) | bytes[len]`
    pub(crate) fn read_u16_prefixed(&mut self) -> Result<&'a [u8], DecodeFault> {
        let len = self.read_u16_be()? as usize;
        self.take(len)
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, DecodeFault> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub(crate) fn read_u64_le(&mut self) -> Result<u64, DecodeFault> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub(crate) fn read_u256_le(&mut self) -> Result<U256, DecodeFault> {
        self.read_array::<32>().map(U256::from_le_bytes)
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool, DecodeFault> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeFault::InvalidValue("bool must be 0 or 1")),
        }
    }

    /// ULEB128 as used for BCS sequence lengths (at most `u32::MAX`).
    pub(crate) fn read_uleb128(&mut self) -> Result<usize, DecodeFault> {
        let mut value: u64 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                if value > u64::from(u32::MAX) {
                    break;
                }
                return Ok(value as usize);
            }
        }
        Err(DecodeFault::InvalidValue("uleb128 length overflows u32"))
    }

    /// Checks that a sub-structure ending at `expected_end` was consumed exactly.
    pub(crate) fn expect_position(&self, expected_end: usize) -> Result<(), DecodeFault> {
        if self.pos != expected_end {
            return Err(DecodeFault::LengthMismatch {
                expected_end,
                position: self.pos,
            });
        }
        Ok(())
    }

    /// Checks that the whole buffer was consumed.
    pub(crate) fn finish(&self) -> Result<(), DecodeFault> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(DecodeFault::TrailingBytes { remaining }),
        }
    }
}

/// Attaches the field being read to a cursor fault.
pub(crate) trait AtField<T> {
    fn at(self, field: MessageField) -> crate::Result<T>;
}

impl<T> AtField<T> for Result<T, DecodeFault> {
    fn at(self, field: MessageField) -> crate::Result<T> {
        self.map_err(|fault| CcipError::MessageDecode { field, fault })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x04];
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(cursor.read_u8().unwrap(), 1);
        assert_eq!(cursor.read_u16_be().unwrap(), 0x0203);
        assert_eq!(cursor.read_u32_be().unwrap(), 4);
        assert!(cursor.finish().is_ok());
    }

    #[test]
    fn test_truncated_reports_sizes() {
        let mut cursor = Cursor::new(&[0u8; 3]);
        assert_eq!(
            cursor.read_u64_be(),
            Err(DecodeFault::Truncated {
                needed: 8,
                remaining: 3
            })
        );
        // a failed read does not advance
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_prefixed_reads() {
        let bytes = [0x02, 0xaa, 0xbb, 0x00, 0x01, 0xcc];
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(cursor.read_u8_prefixed().unwrap(), &[0xaa, 0xbb]);
        assert_eq!(cursor.read_u16_prefixed().unwrap(), &[0xcc]);
        assert!(cursor.finish().is_ok());
    }

    #[test]
    fn test_prefixed_overrun() {
        let mut cursor = Cursor::new(&[0x05, 0x01]);
        assert_eq!(
            cursor.read_u8_prefixed(),
            Err(DecodeFault::Truncated {
                needed: 5,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_uleb128() {
        let mut cursor = Cursor::new(&[0x80, 0x01, 0x05]);
        assert_eq!(cursor.read_uleb128().unwrap(), 128);
        assert_eq!(cursor.read_uleb128().unwrap(), 5);
        let mut overflow = Cursor::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        assert!(overflow.read_uleb128().is_err());
    }

    #[test]
    fn test_position_checks() {
        let mut cursor = Cursor::new(&[0u8; 4]);
        cursor.take(2).unwrap();
        assert!(cursor.expect_position(2).is_ok());
        assert_eq!(
            cursor.expect_position(3),
            Err(DecodeFault::LengthMismatch {
                expected_end: 3,
                position: 2
            })
        );
        assert_eq!(
            cursor.finish(),
            Err(DecodeFault::TrailingBytes { remaining: 2 })
        );
    }

    #[test]
    fn test_bool_strict() {
        assert!(Cursor::new(&[2]).read_bool().is_err());
        assert!(Cursor::new(&[1]).read_bool().unwrap());
    }

    #[test]
    fn test_at_field() {
        let err = Cursor::new(&[]).read_u8().at(MessageField::Version).unwrap_err();
        assert!(matches!(
            err,
            CcipError::MessageDecode {
                field: MessageField::Version,
                fault: DecodeFault::Truncated { .. }
            }
        ));
    }
}
