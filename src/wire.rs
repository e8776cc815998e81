//! Binary wire codec for `Dict`, compatible with the ZeroMQ "dictionary"
//! wire type:
//!
//! ```text
//! packed = count(4 bytes, big-endian) *entry
//! entry  = name-len(1 byte) name-bytes value-len(4 bytes, big-endian) value-bytes
//! ```
//!
//! Comments are never packed. Decoding either yields a complete new dict or
//! fails; no partially decoded dict is ever returned.

use crate::dict::Dict;
use crate::error::{Error, Result};
use crate::value::WireValue;
use core::hash::BuildHasher;

/// Split `n` bytes off the front of `buf`, or report what was truncated.
fn take<'a>(buf: &mut &'a [u8], n: usize, what: &'static str) -> Result<&'a [u8]> {
    if buf.len() < n {
        return Err(Error::CorruptWireData(what));
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

fn take_u32(buf: &mut &[u8], what: &'static str) -> Result<u32> {
    let b = take(buf, 4, what)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

impl<V, S> Dict<V, S>
where
    V: WireValue,
    S: BuildHasher + Clone + Default,
{
    /// Encode all entries into a freshly allocated buffer, in native
    /// iteration order. Fails with [`Error::KeyTooLong`] for keys over 255
    /// bytes and [`Error::ValueTooLong`] for values over `u32::MAX` bytes,
    /// emitting nothing. An empty dict packs to the 4-byte zero count.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let count = u32::try_from(self.len()).map_err(|_| Error::TooManyEntries(self.len()))?;

        // Validate and size in one pass so failure allocates nothing.
        let mut size = 4usize;
        for (key, value) in self.iter() {
            if key.len() > u8::MAX as usize {
                return Err(Error::KeyTooLong(key.len()));
            }
            let vlen = value.wire_bytes().len();
            if vlen > u32::MAX as usize {
                return Err(Error::ValueTooLong(vlen));
            }
            size += 1 + key.len() + 4 + vlen;
        }

        let mut buf = Vec::with_capacity(size);
        buf.extend_from_slice(&count.to_be_bytes());
        for (key, value) in self.iter() {
            buf.push(key.len() as u8);
            buf.extend_from_slice(key.as_bytes());
            let bytes = value.wire_bytes();
            buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            buf.extend_from_slice(bytes);
        }
        Ok(buf)
    }
}

impl<V> Dict<V>
where
    V: WireValue,
{
    /// Decode a packed buffer into a brand-new dict that owns its decoded
    /// keys and values. An empty buffer decodes to an empty dict. Truncated
    /// fields, bytes left over after the declared entry count, and values
    /// rejected by `V` all fail with [`Error::CorruptWireData`].
    pub fn unpack(frame: &[u8]) -> Result<Self> {
        let mut dict = Dict::new();
        if frame.is_empty() {
            return Ok(dict);
        }

        let mut rest = frame;
        let count = take_u32(&mut rest, "truncated entry count")?;
        for _ in 0..count {
            let name_len = take(&mut rest, 1, "truncated key length")?[0] as usize;
            let name_bytes = take(&mut rest, name_len, "truncated key bytes")?;
            let name = std::str::from_utf8(name_bytes)
                .map_err(|_| Error::CorruptWireData("key is not valid utf-8"))?;
            let value_len = take_u32(&mut rest, "truncated value length")? as usize;
            let value_bytes = take(&mut rest, value_len, "truncated value bytes")?;
            let value = V::from_wire(value_bytes.to_vec())
                .ok_or(Error::CorruptWireData("value rejected by value type"))?;
            // Duplicate names inside a frame: the first occurrence wins.
            let _ = dict.insert(name, value);
        }
        if !rest.is_empty() {
            return Err(Error::CorruptWireData("trailing bytes after last entry"));
        }
        Ok(dict)
    }
}
