//! Dialect-agnostic tagged-binary value tree.
//!
//! Both source dialects hand the decoder one of these rather than their own
//! wire format, so `decoder` never needs to know which adapter produced it.

#[derive(Clone, Debug)]
pub enum NbtTree {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(Vec<NbtTree>),
    Compound(Vec<(String, NbtTree)>),
}

impl NbtTree {
    pub fn field(&self, name: &str) -> Option<&NbtTree> {
        match self {
            NbtTree::Compound(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            NbtTree::Byte(v) => Some(i32::from(v)),
            NbtTree::Short(v) => Some(i32::from(v)),
            NbtTree::Int(v) => Some(v),
            NbtTree::Long(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match *self {
            NbtTree::Byte(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NbtTree::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        match self {
            NbtTree::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NbtTree]> {
        match self {
            NbtTree::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<fastnbt::Value> for NbtTree {
    fn from(value: fastnbt::Value) -> Self {
        match value {
            fastnbt::Value::Byte(v) => NbtTree::Byte(v),
            fastnbt::Value::Short(v) => NbtTree::Short(v),
            fastnbt::Value::Int(v) => NbtTree::Int(v),
            fastnbt::Value::Long(v) => NbtTree::Long(v),
            fastnbt::Value::Float(v) => NbtTree::Float(v),
            fastnbt::Value::Double(v) => NbtTree::Double(v),
            fastnbt::Value::String(v) => NbtTree::String(v),
            fastnbt::Value::ByteArray(v) => NbtTree::ByteArray(v.iter().copied().collect()),
            fastnbt::Value::IntArray(v) => NbtTree::IntArray(v.iter().copied().collect()),
            fastnbt::Value::LongArray(v) => NbtTree::LongArray(v.iter().copied().collect()),
            fastnbt::Value::List(v) => NbtTree::List(v.into_iter().map(NbtTree::from).collect()),
            fastnbt::Value::Compound(v) => {
                NbtTree::Compound(v.into_iter().map(|(k, v)| (k, NbtTree::from(v))).collect())
            }
        }
    }
}
