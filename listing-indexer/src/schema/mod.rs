//! Declarative binary layouts for on-chain account data
//!
//! A [`Schema`] is an ordered list of named fields. Each field kind knows how
//! many bytes it needs at minimum, which lets the decoder reject short buffers
//! before reading anything. Integers are little-endian, optional values carry a
//! one-byte presence flag, strings and vectors carry a `u32` length prefix.

mod decoder;

pub use decoder::{decode, decode_prefix};

use crate::core::DecodeError;
use std::fmt;

/// Length of an address field
pub const ADDRESS_LEN: usize = 32;

/// Length of the prefix in front of strings and vectors
pub const LENGTH_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    /// Signed 64-bit, used for unix timestamps
    I64,
    Bool,
    Bytes(usize),
    Address,
    String,
    Option(Box<FieldKind>),
    Struct(Schema),
    FixedArray(Box<FieldKind>, usize),
    /// `u32` element count followed by the elements
    Vec(Box<FieldKind>),
}

impl FieldKind {
    pub fn option(inner: FieldKind) -> Self {
        FieldKind::Option(Box::new(inner))
    }

    pub fn array(inner: FieldKind, len: usize) -> Self {
        FieldKind::FixedArray(Box::new(inner), len)
    }

    pub fn vec(inner: FieldKind) -> Self {
        FieldKind::Vec(Box::new(inner))
    }

    /// Bytes required even when every optional part is absent
    pub fn min_len(&self) -> usize {
        match self {
            FieldKind::U8 | FieldKind::Bool => 1,
            FieldKind::U16 => 2,
            FieldKind::U32 => 4,
            FieldKind::U64 | FieldKind::I64 => 8,
            FieldKind::Bytes(n) => *n,
            FieldKind::Address => ADDRESS_LEN,
            FieldKind::String | FieldKind::Vec(_) => LENGTH_PREFIX_LEN,
            FieldKind::Option(_) => 1,
            FieldKind::Struct(schema) => schema.min_len(),
            FieldKind::FixedArray(inner, n) => inner.min_len() * n,
        }
    }

    /// Exact encoded length, `None` for kinds whose length depends on the data
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            FieldKind::String | FieldKind::Vec(_) | FieldKind::Option(_) => None,
            FieldKind::Struct(schema) => schema.fixed_len(),
            FieldKind::FixedArray(inner, n) => inner.fixed_len().map(|len| len * n),
            other => Some(other.min_len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field { name, kind });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn min_len(&self) -> usize {
        self.fields.iter().map(|f| f.kind.min_len()).sum()
    }

    pub fn fixed_len(&self) -> Option<usize> {
        self.fields.iter().map(|f| f.kind.fixed_len()).sum()
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint(u64),
    Int(i64),
    Bool(bool),
    Bytes(Vec<u8>),
    Address([u8; ADDRESS_LEN]),
    String(String),
    Option(Option<Box<Value>>),
    Record(Record),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<[u8; ADDRESS_LEN]> {
        match self {
            Value::Address(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "{v:?}"),
            Value::Address(v) => f.write_str(&bs58::encode(v).into_string()),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Option(None) => f.write_str("null"),
            Value::Option(Some(v)) => write!(f, "{v}"),
            Value::Record(r) => write!(f, "{r}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Decoded fields in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        pick: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, DecodeError> {
        self.get(name)
            .and_then(pick)
            .ok_or_else(|| DecodeError::FieldMismatch {
                field: name.to_string(),
                expected,
            })
    }

    pub fn uint(&self, name: &str) -> Result<u64, DecodeError> {
        self.typed(name, "unsigned integer", Value::as_uint)
    }

    pub fn u8(&self, name: &str) -> Result<u8, DecodeError> {
        let value = self.uint(name)?;
        u8::try_from(value).map_err(|_| DecodeError::InvalidValue {
            field: name.to_string(),
            reason: format!("{value} does not fit in u8"),
        })
    }

    pub fn u16(&self, name: &str) -> Result<u16, DecodeError> {
        let value = self.uint(name)?;
        u16::try_from(value).map_err(|_| DecodeError::InvalidValue {
            field: name.to_string(),
            reason: format!("{value} does not fit in u16"),
        })
    }

    pub fn int(&self, name: &str) -> Result<i64, DecodeError> {
        self.typed(name, "signed integer", Value::as_int)
    }

    pub fn bool(&self, name: &str) -> Result<bool, DecodeError> {
        self.typed(name, "bool", Value::as_bool)
    }

    pub fn bytes(&self, name: &str) -> Result<&[u8], DecodeError> {
        self.typed(name, "byte array", Value::as_bytes)
    }

    pub fn address(&self, name: &str) -> Result<[u8; ADDRESS_LEN], DecodeError> {
        self.typed(name, "address", Value::as_address)
    }

    pub fn string(&self, name: &str) -> Result<&str, DecodeError> {
        self.typed(name, "string", Value::as_str)
    }

    pub fn record(&self, name: &str) -> Result<&Record, DecodeError> {
        self.typed(name, "record", Value::as_record)
    }

    pub fn array(&self, name: &str) -> Result<&[Value], DecodeError> {
        self.typed(name, "array", Value::as_array)
    }

    /// Inner value of an optional field
    pub fn option(&self, name: &str) -> Result<Option<&Value>, DecodeError> {
        self.typed(name, "option", |value| match value {
            Value::Option(inner) => Some(inner.as_deref()),
            _ => None,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}
