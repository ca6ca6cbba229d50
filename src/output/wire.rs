//! Wire primitives shared by the binarizer and the reader.
//!
//! Integers are fixed width in host byte order with no padding. Strings are
//! a variable-length byte count followed by the raw bytes; the count is
//! written 7 bits at a time, low bits first, with the high bit of each byte
//! set when more bytes follow.

use crate::aggregator::score::CompileData;
use crate::aggregator::strings::crc64;
use crate::utils::error::FormatError;
use std::io::{self, Read, Write};

// A u32 length never needs more than 5 groups of 7 bits
const MAX_LENGTH_BYTES: usize = 5;

/// Upper bound on up-front allocation for a count read from a file
const MAX_PREALLOCATED: usize = 4096;

pub fn write_u8(w: &mut impl Write, value: u8) -> io::Result<()> {
    w.write_all(&[value])
}

pub fn write_u32(w: &mut impl Write, value: u32) -> io::Result<()> {
    w.write_all(&value.to_ne_bytes())
}

pub fn write_u64(w: &mut impl Write, value: u64) -> io::Result<()> {
    w.write_all(&value.to_ne_bytes())
}

/// Write a string with its 7-bit continuation length prefix
pub fn write_string(w: &mut impl Write, text: &str) -> io::Result<()> {
    let mut remaining = text.len();
    loop {
        let mut byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining != 0 {
            byte |= 0x80;
        }
        write_u8(w, byte)?;
        if remaining == 0 {
            break;
        }
    }
    w.write_all(text.as_bytes())
}

/// Write a u32 count followed by the ids
pub fn write_ids<'a>(w: &mut impl Write, ids: impl ExactSizeIterator<Item = &'a u32>) -> io::Result<()> {
    write_u32(w, ids.len() as u32)?;
    for &id in ids {
        write_u32(w, id)?;
    }
    Ok(())
}

/// Write one statistics record under `name`
pub fn write_compile_data(w: &mut impl Write, name: &str, data: &CompileData) -> io::Result<()> {
    write_string(w, name)?;
    write_u64(w, data.accumulated)?;
    write_u64(w, data.self_accumulated)?;
    write_u32(w, data.minimum)?;
    write_u32(w, data.maximum)?;
    write_u32(w, data.self_maximum)?;
    write_u32(w, data.count)?;
    write_u32(w, data.unit_count)?;
    write_u64(w, data.unit_accumulated)?;
    write_u32(w, data.max_id)?;
    write_u32(w, data.self_max_id)
}

pub fn read_u8(r: &mut impl Read) -> Result<u8, FormatError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32(r: &mut impl Read) -> Result<u32, FormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_ne_bytes(buf))
}

/// Read a u32, or `None` when the stream ends cleanly before it
pub fn try_read_u32(r: &mut impl Read) -> Result<Option<u32>, FormatError> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(u32::from_ne_bytes(buf)))
}

pub fn read_u64(r: &mut impl Read) -> Result<u64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_ne_bytes(buf))
}

pub fn read_string(r: &mut impl Read) -> Result<String, FormatError> {
    let mut length = 0usize;
    let mut shift = 0;
    for index in 0.. {
        if index == MAX_LENGTH_BYTES {
            return Err(FormatError::InvalidLength);
        }
        let byte = read_u8(r)?;
        length |= ((byte & 0x7f) as usize) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            break;
        }
    }

    if length > u32::MAX as usize {
        return Err(FormatError::InvalidLength);
    }

    // Grow with the bytes actually present rather than trusting the prefix
    let mut bytes = Vec::with_capacity(length.min(MAX_PREALLOCATED));
    r.by_ref().take(length as u64).read_to_end(&mut bytes)?;
    if bytes.len() != length {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(String::from_utf8(bytes)?)
}

pub fn read_ids(r: &mut impl Read) -> Result<Vec<u32>, FormatError> {
    let count = read_u32(r)?;
    let mut ids = Vec::with_capacity(capacity_for(count));
    for _ in 0..count {
        ids.push(read_u32(r)?);
    }
    Ok(ids)
}

/// Initial capacity for a list whose length was read from a file
pub fn capacity_for(count: u32) -> usize {
    (count as usize).min(MAX_PREALLOCATED)
}

/// Read one statistics record, returning its name and data
///
/// The name hash is recomputed from the decoded name.
pub fn read_compile_data(r: &mut impl Read) -> Result<(String, CompileData), FormatError> {
    let name = read_string(r)?;
    let mut data = CompileData::new(crc64(name.as_bytes()));
    data.accumulated = read_u64(r)?;
    data.self_accumulated = read_u64(r)?;
    data.minimum = read_u32(r)?;
    data.maximum = read_u32(r)?;
    data.self_maximum = read_u32(r)?;
    data.count = read_u32(r)?;
    data.unit_count = read_u32(r)?;
    data.unit_accumulated = read_u64(r)?;
    data.max_id = read_u32(r)?;
    data.self_max_id = read_u32(r)?;
    Ok((name, data))
}
