//! Minimal little-endian NBT reader for the values embedded in the
//! bedrock leveldb store.
//!
//! `fastnbt` only reads the big-endian java wire format, so this hand-rolled
//! reader covers the one dialect the ecosystem doesn't.

use crate::nbt_tree::NbtTree;
use anyhow::{bail, Context, Result};
use std::io::{Cursor, Read};

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data) }
    }

    fn bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf).context("unexpected end of NBT data")?;
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.bytes(2)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.bytes(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.bytes(8)?.try_into().unwrap()))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.bytes(4)?.try_into().unwrap()))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.bytes(8)?.try_into().unwrap()))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.i16()? as u16 as usize;
        let raw = self.bytes(len)?;
        String::from_utf8(raw).context("NBT string was not valid UTF-8")
    }

    fn payload(&mut self, tag: u8) -> Result<NbtTree> {
        match tag {
            TAG_BYTE => Ok(NbtTree::Byte(self.u8()? as i8)),
            TAG_SHORT => Ok(NbtTree::Short(self.i16()?)),
            TAG_INT => Ok(NbtTree::Int(self.i32()?)),
            TAG_LONG => Ok(NbtTree::Long(self.i64()?)),
            TAG_FLOAT => Ok(NbtTree::Float(self.f32()?)),
            TAG_DOUBLE => Ok(NbtTree::Double(self.f64()?)),
            TAG_STRING => Ok(NbtTree::String(self.string()?)),
            TAG_BYTE_ARRAY => {
                let len = self.i32()? as usize;
                let raw = self.bytes(len)?;
                Ok(NbtTree::ByteArray(raw.into_iter().map(|b| b as i8).collect()))
            }
            TAG_INT_ARRAY => {
                let len = self.i32()? as usize;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.i32()?);
                }
                Ok(NbtTree::IntArray(values))
            }
            TAG_LONG_ARRAY => {
                let len = self.i32()? as usize;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.i64()?);
                }
                Ok(NbtTree::LongArray(values))
            }
            TAG_LIST => {
                let element_tag = self.u8()?;
                let len = self.i32()? as usize;
                let mut values = Vec::with_capacity(len);
                if element_tag != TAG_END {
                    for _ in 0..len {
                        values.push(self.payload(element_tag)?);
                    }
                }
                Ok(NbtTree::List(values))
            }
            TAG_COMPOUND => {
                let mut fields = Vec::new();
                loop {
                    let field_tag = self.u8()?;
                    if field_tag == TAG_END {
                        break;
                    }
                    let name = self.string()?;
                    let value = self.payload(field_tag)?;
                    fields.push((name, value));
                }
                Ok(NbtTree::Compound(fields))
            }
            other => bail!("unsupported NBT tag byte: {other}"),
        }
    }
}

/// Parses a complete little-endian NBT document, as stored by the bedrock
/// server in its leveldb values. The root tag is always a named compound.
pub fn parse_little_endian(data: &[u8]) -> Result<NbtTree> {
    let mut reader = Reader::new(data);

    let root_tag = reader.u8()?;
    if root_tag != TAG_COMPOUND {
        bail!("expected root compound tag, found {root_tag}");
    }
    let _root_name = reader.string()?;

    reader.payload(TAG_COMPOUND)
}

#[cfg(test)]
mod test {
    use super::*;

    fn compound_with_one_short(name: &str, field: &str, value: i16) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(TAG_COMPOUND);
        buf.extend((name.len() as i16).to_le_bytes());
        buf.extend(name.as_bytes());

        buf.push(TAG_SHORT);
        buf.extend((field.len() as i16).to_le_bytes());
        buf.extend(field.as_bytes());
        buf.extend(value.to_le_bytes());

        buf.push(TAG_END);
        buf
    }

    #[test]
    fn parses_flat_compound() {
        let raw = compound_with_one_short("", "scale", 2);
        let tree = parse_little_endian(&raw).unwrap();

        assert_eq!(tree.field("scale").and_then(NbtTree::as_i32), Some(2));
    }

    #[test]
    fn rejects_non_compound_root() {
        let raw = vec![TAG_BYTE, 0, 0, 7];
        assert!(parse_little_endian(&raw).is_err());
    }
}
