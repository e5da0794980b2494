//! PackStream encoding: [`Value`] -> bytes.
//!
//! Layout reference (big-endian throughout):
//! ```text
//! Null      C0
//! Bool      C2 | C3
//! Tiny int  F0..FF | 00..7F
//! Int       C8 i8 | C9 i16 | CA i32 | CB i64
//! Float     C1 f64
//! String    80..8F len | D0 u8 | D1 u16 | D2 u32
//! List      90..9F len | D4 u8 | D5 u16 | D6 u32
//! Dict      A0..AF len | D8 u8 | D9 u16 | DA u32
//! Struct    B0..BF len | DC u8 | DD u16, then tag byte, then fields
//! ```

use super::error::{PackstreamError, PackstreamResult};
use super::value::Value;

const MAX_CONTAINER_SIZE: u64 = u32::MAX as u64;
const MAX_STRUCT_FIELDS: u64 = u16::MAX as u64;

/// Pack a single value, appending its bytes to `out`.
pub fn encode(value: &Value, out: &mut Vec<u8>) -> PackstreamResult<()> {
    match value {
        Value::Null => out.push(0xC0),
        Value::Bool(false) => out.push(0xC2),
        Value::Bool(true) => out.push(0xC3),
        Value::Int(n) => encode_int(*n, out),
        Value::Float(f) => {
            out.push(0xC1);
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => encode_string(s, out)?,
        Value::List(items) => encode_list(items, out)?,
        Value::Dict(entries) => encode_dict(entries, out)?,
        Value::Struct { tag, fields } => encode_struct(*tag, fields, out)?,
    }
    Ok(())
}

/// Pack a value into a freshly-allocated byte vector.
pub fn pack(value: &Value) -> PackstreamResult<Vec<u8>> {
    let mut out = Vec::new();
    encode(value, &mut out)?;
    Ok(out)
}

fn encode_int(n: i64, out: &mut Vec<u8>) {
    if (-0x10..0x80).contains(&n) {
        out.push(n as i8 as u8);
    } else if (-0x80..0x80).contains(&n) {
        out.push(0xC8);
        out.push(n as i8 as u8);
    } else if (-0x8000..0x8000).contains(&n) {
        out.push(0xC9);
        out.extend_from_slice(&(n as i16).to_be_bytes());
    } else if (-0x8000_0000..0x8000_0000).contains(&n) {
        out.push(0xCA);
        out.extend_from_slice(&(n as i32).to_be_bytes());
    } else {
        out.push(0xCB);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_string(s: &str, out: &mut Vec<u8>) -> PackstreamResult<()> {
    let bytes = s.as_bytes();
    let size = bytes.len();
    if size < 0x10 {
        out.push(0x80 | size as u8);
    } else if size < 0x100 {
        out.push(0xD0);
        out.push(size as u8);
    } else if size < 0x1_0000 {
        out.push(0xD1);
        out.extend_from_slice(&(size as u16).to_be_bytes());
    } else if (size as u64) < (1u64 << 32) {
        out.push(0xD2);
        out.extend_from_slice(&(size as u32).to_be_bytes());
    } else {
        return Err(PackstreamError::ContainerTooLarge {
            size,
            max: MAX_CONTAINER_SIZE,
        });
    }
    out.extend_from_slice(bytes);
    Ok(())
}

fn encode_list(items: &[Value], out: &mut Vec<u8>) -> PackstreamResult<()> {
    let size = items.len();
    if (size as u64) > MAX_CONTAINER_SIZE {
        return Err(PackstreamError::ContainerTooLarge {
            size,
            max: MAX_CONTAINER_SIZE,
        });
    }
    if size < 0x10 {
        out.push(0x90 | size as u8);
    } else if size < 0x100 {
        out.push(0xD4);
        out.push(size as u8);
    } else if size < 0x1_0000 {
        out.push(0xD5);
        out.extend_from_slice(&(size as u16).to_be_bytes());
    } else {
        out.push(0xD6);
        out.extend_from_slice(&(size as u32).to_be_bytes());
    }
    for item in items {
        encode(item, out)?;
    }
    Ok(())
}

fn encode_dict(entries: &[(String, Value)], out: &mut Vec<u8>) -> PackstreamResult<()> {
    let size = entries.len();
    if (size as u64) > MAX_CONTAINER_SIZE {
        return Err(PackstreamError::ContainerTooLarge {
            size,
            max: MAX_CONTAINER_SIZE,
        });
    }
    if size < 0x10 {
        out.push(0xA0 | size as u8);
    } else if size < 0x100 {
        out.push(0xD8);
        out.push(size as u8);
    } else if size < 0x1_0000 {
        out.push(0xD9);
        out.extend_from_slice(&(size as u16).to_be_bytes());
    } else {
        out.push(0xDA);
        out.extend_from_slice(&(size as u32).to_be_bytes());
    }
    for (key, value) in entries {
        encode_string(key, out)?;
        encode(value, out)?;
    }
    Ok(())
}

fn encode_struct(tag: u8, fields: &[Value], out: &mut Vec<u8>) -> PackstreamResult<()> {
    if tag & 0x80 != 0 {
        return Err(PackstreamError::StructureTagOutOfRange(tag));
    }
    let size = fields.len();
    if (size as u64) > MAX_STRUCT_FIELDS {
        return Err(PackstreamError::StructureTooLarge {
            size,
            max: MAX_STRUCT_FIELDS,
        });
    }
    if size < 0x10 {
        out.push(0xB0 | size as u8);
    } else if size < 0x100 {
        out.push(0xDC);
        out.push(size as u8);
    } else {
        out.push(0xDD);
        out.extend_from_slice(&(size as u16).to_be_bytes());
    }
    out.push(tag);
    for field in fields {
        encode(field, out)?;
    }
    Ok(())
}
