// Primitive wire encodings.
//
// The codec is a hand-written binary format over byte buffers:
// - integers: big-endian, 4 bytes (`u32`/`i32`)
// - bools and enum ordinals: 1 byte
// - strings: u32 byte length, then UTF-8 bytes
// - sequences: u32 element count, then that many encoded elements
//
// `Writer` appends to an owned buffer; `Reader` walks a borrowed slice and
// returns `DecodeError` instead of reading past the end. Declared lengths
// are capped (`MAX_SEQUENCE_LEN`) so a malformed count can never trigger an
// unbounded allocation.
//
// Every error is explicit: an unknown enum ordinal, a truncated payload, or
// bytes left over after a complete message all fail decoding rather than
// being silently ignored.

use thiserror::Error;

/// Upper bound on any declared string length or element count. The largest
/// real payload is a full roster snapshot — a few hundred cards — so this is
/// generous headroom while still rejecting garbage counts.
pub const MAX_SEQUENCE_LEN: u32 = 1 << 16;

/// Why a payload failed to decode.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The leading message-kind byte matched no known message.
    #[error("unknown message tag {0:#04x}")]
    UnknownTag(u8),
    /// An enum field held a byte outside its variant range.
    #[error("unknown {what} ordinal {value}")]
    UnknownOrdinal { what: &'static str, value: i64 },
    /// The payload ended before the declared content did.
    #[error("truncated payload: wanted {wanted} more bytes, {available} left")]
    Truncated { wanted: usize, available: usize },
    /// The payload continued past the end of the message.
    #[error("{0} trailing bytes after message payload")]
    TrailingBytes(usize),
    /// A declared length exceeded `MAX_SEQUENCE_LEN`.
    #[error("declared length {0} exceeds limit {MAX_SEQUENCE_LEN}")]
    LengthLimit(u32),
    /// A string field held invalid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
}

/// Append-only encoder.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_str(&mut self, s: &str) {
        self.put_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

/// Cursor-style decoder over a borrowed payload.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                wanted: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.u8()? != 0)
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// A declared length or element count, bounds-checked.
    pub fn len(&mut self) -> Result<usize, DecodeError> {
        let len = self.u32()?;
        if len > MAX_SEQUENCE_LEN {
            return Err(DecodeError::LengthLimit(len));
        }
        Ok(len as usize)
    }

    pub fn str(&mut self) -> Result<String, DecodeError> {
        let len = self.len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Fails if any bytes remain unconsumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        if self.remaining() > 0 {
            return Err(DecodeError::TrailingBytes(self.remaining()));
        }
        Ok(())
    }
}
