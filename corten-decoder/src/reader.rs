//! The byte source under the decoder.
//!
//! [`ByteReader`] is a cursor over a byte buffer with the primitive
//! reads the binary format needs: raw bytes, LEB128 integers with
//! per-call byte and bit caps, little-endian float bit patterns, and
//! length-prefixed UTF-8 names. The current offset is tracked for error
//! reporting ([`ByteReader::tell`]).

use alloc::string::String;

use corten_error::{codes, Error, Result};
use corten_format::{FloatBits32, FloatBits64};

const INTEGER_TOO_LONG: Error =
    Error::parse(codes::INTEGER_TOO_LONG, "integer representation too long");
const INTEGER_TOO_LARGE: Error =
    Error::parse(codes::INTEGER_TOO_LARGE, "integer too large for its bit width");

/// A random-access cursor over module bytes.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader over a byte buffer.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[must_use]
    pub const fn tell(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::unexpected_end());
        }
        self.pos = pos;
        Ok(())
    }

    /// Whether any bytes remain.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or_else(Error::unexpected_end)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(Error::unexpected_end)?;
        let slice = self.data.get(self.pos..end).ok_or_else(Error::unexpected_end)?;
        self.pos = end;
        Ok(slice)
    }

    /// Read an unsigned LEB128 integer of at most 32 bits.
    pub fn read_u32_leb(&mut self) -> Result<u32> {
        self.read_unsigned_leb(32).map(|v| v as u32)
    }

    /// Read an unsigned LEB128 integer of at most 64 bits.
    pub fn read_u64_leb(&mut self) -> Result<u64> {
        self.read_unsigned_leb(64)
    }

    /// Read a signed LEB128 integer of at most 32 bits.
    pub fn read_s32_leb(&mut self) -> Result<i32> {
        self.read_signed_leb(32).map(|v| v as i32)
    }

    /// Read a signed LEB128 integer of at most 64 bits.
    pub fn read_s64_leb(&mut self) -> Result<i64> {
        self.read_signed_leb(64)
    }

    /// Read an f32 as its little-endian bit pattern.
    pub fn read_f32(&mut self) -> Result<FloatBits32> {
        let bytes = self.read_bytes(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(FloatBits32::from_bits(u32::from_le_bytes(arr)))
    }

    /// Read an f64 as its little-endian bit pattern.
    pub fn read_f64(&mut self) -> Result<FloatBits64> {
        let bytes = self.read_bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(FloatBits64::from_bits(u64::from_le_bytes(arr)))
    }

    /// Read a length-prefixed UTF-8 name.
    pub fn read_name(&mut self) -> Result<String> {
        let len = self.read_u32_leb()? as usize;
        let bytes = self.read_bytes(len)?;
        let s = core::str::from_utf8(bytes)
            .map_err(|_| Error::parse(codes::INVALID_UTF8, "name is not valid UTF-8"))?;
        Ok(String::from(s))
    }

    /// Decode an unsigned LEB128 value of at most `max_bits` bits.
    ///
    /// A continuation bit on the last permitted byte is
    /// `INTEGER_TOO_LONG`; set payload bits beyond `max_bits` in the
    /// final byte are `INTEGER_TOO_LARGE`.
    fn read_unsigned_leb(&mut self, max_bits: u32) -> Result<u64> {
        let max_bytes = max_bits.div_ceil(7);
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        for _ in 0..max_bytes {
            let byte = self.read_u8()?;
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                let bits_needed = max_bits - shift;
                if bits_needed < 7 && (byte >> bits_needed) != 0 {
                    return Err(INTEGER_TOO_LARGE);
                }
                return Ok(result);
            }
            shift += 7;
        }
        Err(INTEGER_TOO_LONG)
    }

    /// Decode a signed LEB128 value of at most `max_bits` bits.
    ///
    /// In the final byte, every payload bit beyond `max_bits` must equal
    /// the sign bit, otherwise the encoding is `INTEGER_TOO_LARGE`.
    fn read_signed_leb(&mut self, max_bits: u32) -> Result<i64> {
        let max_bytes = max_bits.div_ceil(7);
        let mut result: i64 = 0;
        let mut shift: u32 = 0;
        for _ in 0..max_bytes {
            let byte = self.read_u8()?;
            result |= i64::from(byte & 0x7F) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift > max_bits {
                    let bits_needed = max_bits - (shift - 7);
                    let sign = (byte >> (bits_needed - 1)) & 1;
                    let excess_mask = (1u8 << (7 - bits_needed)) - 1;
                    let expected = if sign == 1 { excess_mask } else { 0 };
                    if (byte >> bits_needed) & excess_mask != expected {
                        return Err(INTEGER_TOO_LARGE);
                    }
                }
                if shift < 64 && (byte & 0x40) != 0 {
                    result |= -1i64 << shift;
                }
                return Ok(result);
            }
        }
        Err(INTEGER_TOO_LONG)
    }
}

/// Read a whole file into memory.
///
/// A missing or unopenable file is `INVALID_PATH`; any other I/O
/// failure is `READ_ERROR`.
#[cfg(feature = "std")]
pub fn read_file(path: &std::path::Path) -> Result<alloc::vec::Vec<u8>> {
    std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            Error::parse(codes::INVALID_PATH, "cannot open module file")
        }
        std::io::ErrorKind::UnexpectedEof => Error::unexpected_end(),
        _ => Error::parse(codes::READ_ERROR, "i/o error while reading module file"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u32_leb_basic() {
        let mut reader = ByteReader::new(&[0xE5, 0x8E, 0x26]);
        assert_eq!(reader.read_u32_leb().unwrap(), 624_485);
        assert!(!reader.has_more());
    }

    #[test]
    fn test_read_u32_leb_nonminimal_is_accepted() {
        // 0 encoded in two bytes is legal, only the byte cap is enforced.
        let mut reader = ByteReader::new(&[0x80, 0x00]);
        assert_eq!(reader.read_u32_leb().unwrap(), 0);
    }

    #[test]
    fn test_read_u32_leb_too_long() {
        let mut reader = ByteReader::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);
        assert_eq!(reader.read_u32_leb(), Err(INTEGER_TOO_LONG));
    }

    #[test]
    fn test_read_u32_leb_too_large() {
        // Fifth byte may only contribute four bits.
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert_eq!(reader.read_u32_leb(), Err(INTEGER_TOO_LARGE));
        let mut ok = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(ok.read_u32_leb().unwrap(), u32::MAX);
    }

    #[test]
    fn test_read_s32_leb_sign_extension() {
        let mut reader = ByteReader::new(&[0x7F]);
        assert_eq!(reader.read_s32_leb().unwrap(), -1);
        let mut reader = ByteReader::new(&[0xC0, 0xBB, 0x78]);
        assert_eq!(reader.read_s32_leb().unwrap(), -123_456);
    }

    #[test]
    fn test_read_s32_leb_final_byte_checks() {
        // -1 padded to five bytes: sign bits in the excess positions.
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(reader.read_s32_leb().unwrap(), -1);
        // Excess bits disagree with the sign bit.
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x4F]);
        assert_eq!(reader.read_s32_leb(), Err(INTEGER_TOO_LARGE));
    }

    #[test]
    fn test_read_s64_leb_extremes() {
        let mut reader = ByteReader::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7F]);
        assert_eq!(reader.read_s64_leb().unwrap(), i64::MIN);
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(reader.read_s64_leb().unwrap(), i64::MAX);
    }

    #[test]
    fn test_eof_mid_read() {
        let mut reader = ByteReader::new(&[0x80]);
        assert_eq!(reader.read_u32_leb(), Err(Error::unexpected_end()));
        let mut reader = ByteReader::new(&[0x01, 0x02]);
        assert_eq!(reader.read_bytes(3), Err(Error::unexpected_end()));
    }

    #[test]
    fn test_read_floats_little_endian() {
        let bits = 0x3FC0_0000u32; // 1.5f32
        let bytes = bits.to_le_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_f32().unwrap().value(), 1.5);
    }

    #[test]
    fn test_read_name_utf8() {
        let mut reader = ByteReader::new(&[0x03, b'e', b'n', b'v']);
        assert_eq!(reader.read_name().unwrap(), "env");
        let mut reader = ByteReader::new(&[0x02, 0xFF, 0xFE]);
        assert_eq!(
            reader.read_name().unwrap_err().code(),
            codes::INVALID_UTF8
        );
    }

    #[test]
    fn test_tell_and_seek() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        reader.read_u8().unwrap();
        assert_eq!(reader.tell(), 1);
        reader.seek(3).unwrap();
        assert!(!reader.has_more());
        assert!(reader.seek(4).is_err());
    }
}
