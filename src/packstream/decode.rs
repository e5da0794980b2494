//! PackStream decoding: bytes -> [`Value`].

use super::error::{PackstreamError, PackstreamResult};
use super::value::Value;

/// Reserved marker bytes that carry no defined meaning in this version of the format.
fn is_reserved_marker(marker: u8) -> bool {
    matches!(marker, 0xC4..=0xC7 | 0xCC..=0xCF | 0xD3 | 0xD7 | 0xDB | 0xDE..=0xEF)
}

/// A cursor over an in-memory byte slice, used to decode one or more values.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Decoder { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn need(&self, n: usize) -> PackstreamResult<()> {
        if self.buf.len() - self.pos < n {
            Err(PackstreamError::Truncated {
                needed: n - (self.buf.len() - self.pos),
            })
        } else {
            Ok(())
        }
    }

    fn take(&mut self, n: usize) -> PackstreamResult<&'a [u8]> {
        self.need(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u8(&mut self) -> PackstreamResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self) -> PackstreamResult<u16> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn take_u32(&mut self) -> PackstreamResult<u32> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    /// Decode the next value from the cursor.
    pub fn decode(&mut self) -> PackstreamResult<Value> {
        let marker = self.take_u8()?;
        if is_reserved_marker(marker) {
            return Err(PackstreamError::BadMarker(marker));
        }
        match marker {
            0xC0 => Ok(Value::Null),
            0xC1 => {
                let bytes = self.take(8)?;
                Ok(Value::Float(f64::from_be_bytes(bytes.try_into().unwrap())))
            }
            0xC2 => Ok(Value::Bool(false)),
            0xC3 => Ok(Value::Bool(true)),
            0xC8 => Ok(Value::Int(self.take_u8()? as i8 as i64)),
            0xC9 => Ok(Value::Int(self.take_u16()? as i16 as i64)),
            0xCA => Ok(Value::Int(self.take_u32()? as i32 as i64)),
            0xCB => {
                let bytes = self.take(8)?;
                Ok(Value::Int(i64::from_be_bytes(bytes.try_into().unwrap())))
            }
            0x00..=0x7F => Ok(Value::Int(marker as i64)),
            0xF0..=0xFF => Ok(Value::Int(marker as i8 as i64)),
            0x80..=0x8F => self.decode_string((marker & 0x0F) as usize),
            0xD0 => {
                let size = self.take_u8()? as usize;
                self.decode_string(size)
            }
            0xD1 => {
                let size = self.take_u16()? as usize;
                self.decode_string(size)
            }
            0xD2 => {
                let size = self.take_u32()? as usize;
                self.decode_string(size)
            }
            0x90..=0x9F => self.decode_list((marker & 0x0F) as usize),
            0xD4 => {
                let size = self.take_u8()? as usize;
                self.decode_list(size)
            }
            0xD5 => {
                let size = self.take_u16()? as usize;
                self.decode_list(size)
            }
            0xD6 => {
                let size = self.take_u32()? as usize;
                self.decode_list(size)
            }
            0xA0..=0xAF => self.decode_dict((marker & 0x0F) as usize),
            0xD8 => {
                let size = self.take_u8()? as usize;
                self.decode_dict(size)
            }
            0xD9 => {
                let size = self.take_u16()? as usize;
                self.decode_dict(size)
            }
            0xDA => {
                let size = self.take_u32()? as usize;
                self.decode_dict(size)
            }
            0xB0..=0xBF => self.decode_struct((marker & 0x0F) as usize),
            0xDC => {
                let size = self.take_u8()? as usize;
                self.decode_struct(size)
            }
            0xDD => {
                let size = self.take_u16()? as usize;
                self.decode_struct(size)
            }
            other => Err(PackstreamError::BadMarker(other)),
        }
    }

    fn decode_string(&mut self, size: usize) -> PackstreamResult<Value> {
        let bytes = self.take(size)?;
        let s = std::str::from_utf8(bytes)?;
        Ok(Value::String(s.to_string()))
    }

    fn decode_list(&mut self, size: usize) -> PackstreamResult<Value> {
        let mut items = Vec::with_capacity(size.min(4096));
        for _ in 0..size {
            items.push(self.decode()?);
        }
        Ok(Value::List(items))
    }

    fn decode_dict(&mut self, size: usize) -> PackstreamResult<Value> {
        let mut entries = Vec::with_capacity(size.min(4096));
        for _ in 0..size {
            let key_marker = self.take_u8()?;
            let key_size = match key_marker {
                0x80..=0x8F => (key_marker & 0x0F) as usize,
                0xD0 => self.take_u8()? as usize,
                0xD1 => self.take_u16()? as usize,
                0xD2 => self.take_u32()? as usize,
                other => return Err(PackstreamError::NonStringKey(other)),
            };
            let key_bytes = self.take(key_size)?;
            let key = std::str::from_utf8(key_bytes)?.to_string();
            let value = self.decode()?;
            entries.push((key, value));
        }
        Ok(Value::Dict(entries))
    }

    fn decode_struct(&mut self, size: usize) -> PackstreamResult<Value> {
        let tag = self.take_u8()?;
        let mut fields = Vec::with_capacity(size.min(4096));
        for _ in 0..size {
            fields.push(self.decode()?);
        }
        Ok(Value::Struct { tag, fields })
    }
}

/// Decode exactly one value from `buf`, returning it together with any trailing bytes.
pub fn unpack(buf: &[u8]) -> PackstreamResult<(Value, &[u8])> {
    let mut decoder = Decoder::new(buf);
    let value = decoder.decode()?;
    Ok((value, decoder.remaining()))
}

/// Decode every value packed back-to-back in `buf`, requiring the buffer to be fully consumed.
pub fn unpack_all(buf: &[u8]) -> PackstreamResult<Vec<Value>> {
    let mut decoder = Decoder::new(buf);
    let mut values = Vec::new();
    while !decoder.is_empty() {
        values.push(decoder.decode()?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packstream::encode::pack;

    #[test]
    fn round_trip_int() {
        for n in [-2147483649i64, -17, -1, 0, 42, 127, 32768, i64::MAX, i64::MIN] {
            let packed = pack(&Value::Int(n)).unwrap();
            let (value, rest) = unpack(&packed).unwrap();
            assert!(rest.is_empty());
            assert_eq!(value, Value::Int(n));
        }
    }

    #[test]
    fn round_trip_string() {
        let long = "x".repeat(300);
        for s in ["", "hello", long.as_str()] {
            let packed = pack(&Value::string(s)).unwrap();
            let (value, _) = unpack(&packed).unwrap();
            assert_eq!(value, Value::string(s));
        }
    }

    #[test]
    fn round_trip_nested() {
        let v = Value::Struct {
            tag: 0x01,
            fields: vec![
                Value::List(vec![Value::Int(1), Value::Null, Value::Bool(true)]),
                Value::Dict(vec![("a".into(), Value::Float(1.5))]),
            ],
        };
        let packed = pack(&v).unwrap();
        let (decoded, rest) = unpack(&packed).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, v);
    }

    #[test]
    fn reserved_marker_rejected() {
        let err = unpack(&[0xC5]).unwrap_err();
        assert!(matches!(err, PackstreamError::BadMarker(0xC5)));
    }

    #[test]
    fn truncated_buffer() {
        let err = unpack(&[0xC9, 0x00]).unwrap_err();
        assert!(matches!(err, PackstreamError::Truncated { .. }));
    }

    #[test]
    fn large_dict_marker() {
        let entries: Vec<(String, Value)> =
            (0..26).map(|i| (format!("k{i}"), Value::Int(i))).collect();
        let packed = pack(&Value::Dict(entries)).unwrap();
        assert_eq!(&packed[..2], &[0xD8, 0x1A]);
    }
}
