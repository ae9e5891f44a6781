//! Schema-driven decoder

use super::{FieldKind, Record, Schema, Value, ADDRESS_LEN, LENGTH_PREFIX_LEN};
use crate::core::DecodeError;

/// Decode `buf` against `schema`. Trailing bytes are ignored.
pub fn decode(schema: &Schema, buf: &[u8]) -> Result<Record, DecodeError> {
    decode_prefix(schema, buf).map(|(record, _)| record)
}

/// Decode `buf` against `schema`, also returning the number of bytes consumed.
pub fn decode_prefix(schema: &Schema, buf: &[u8]) -> Result<(Record, usize), DecodeError> {
    let needed = schema.min_len();
    if buf.len() < needed {
        return Err(DecodeError::TruncatedBuffer {
            needed,
            available: buf.len(),
        });
    }

    let mut reader = Reader { buf, pos: 0 };
    let record = reader.read_record(schema)?;
    Ok((record, reader.pos))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.saturating_add(n);
        if end > self.buf.len() {
            return Err(DecodeError::TruncatedBuffer {
                needed: end,
                available: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_uint(&mut self, width: usize) -> Result<u64, DecodeError> {
        let bytes = self.take(width)?;
        let mut le = [0u8; 8];
        le[..width].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(le))
    }

    fn read_length(&mut self, field: &str, item_min: usize) -> Result<usize, DecodeError> {
        let len = self.read_uint(LENGTH_PREFIX_LEN)? as usize;
        // reject counts the rest of the buffer cannot possibly hold
        let needed = len.saturating_mul(item_min.max(1));
        if needed > self.remaining() {
            return Err(DecodeError::TruncatedBuffer {
                needed: self.pos.saturating_add(needed),
                available: self.buf.len(),
            });
        }
        if len > 0 && item_min == 0 {
            return Err(DecodeError::InvalidValue {
                field: field.to_string(),
                reason: "zero-sized elements".to_string(),
            });
        }
        Ok(len)
    }

    fn read_record(&mut self, schema: &Schema) -> Result<Record, DecodeError> {
        let mut record = Record::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = self.read_value(field.name, &field.kind)?;
            record.push(field.name, value);
        }
        Ok(record)
    }

    fn read_value(&mut self, name: &str, kind: &FieldKind) -> Result<Value, DecodeError> {
        let value = match kind {
            FieldKind::U8 => Value::Uint(self.read_uint(1)?),
            FieldKind::U16 => Value::Uint(self.read_uint(2)?),
            FieldKind::U32 => Value::Uint(self.read_uint(4)?),
            FieldKind::U64 => Value::Uint(self.read_uint(8)?),
            FieldKind::I64 => Value::Int(self.read_uint(8)? as i64),
            FieldKind::Bool => Value::Bool(self.read_uint(1)? != 0),
            FieldKind::Bytes(n) => Value::Bytes(self.take(*n)?.to_vec()),
            FieldKind::Address => {
                let mut address = [0u8; ADDRESS_LEN];
                address.copy_from_slice(self.take(ADDRESS_LEN)?);
                Value::Address(address)
            }
            FieldKind::String => {
                let len = self.read_length(name, 1)?;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidEncoding {
                    field: name.to_string(),
                })?;
                Value::String(s.to_string())
            }
            FieldKind::Option(inner) => {
                let present = self.read_uint(1)? != 0;
                if present {
                    Value::Option(Some(Box::new(self.read_value(name, inner)?)))
                } else {
                    Value::Option(None)
                }
            }
            FieldKind::Struct(schema) => Value::Record(self.read_record(schema)?),
            FieldKind::FixedArray(inner, len) => Value::Array(self.read_items(name, inner, *len)?),
            FieldKind::Vec(inner) => {
                let len = self.read_length(name, inner.min_len())?;
                Value::Array(self.read_items(name, inner, len)?)
            }
        };
        Ok(value)
    }

    fn read_items(
        &mut self,
        name: &str,
        inner: &FieldKind,
        len: usize,
    ) -> Result<Vec<Value>, DecodeError> {
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.read_value(name, inner)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_schema() -> Schema {
        Schema::new()
            .field("amount", FieldKind::U64)
            .field("length", FieldKind::U64)
    }

    fn sample_schema() -> Schema {
        Schema::new()
            .field("key", FieldKind::U8)
            .field("order", FieldKind::U16)
            .field("count", FieldKind::U32)
            .field("flag", FieldKind::Bool)
            .field("owner", FieldKind::Address)
            .field("tick", FieldKind::option(FieldKind::U64))
            .field("ranges", FieldKind::vec(FieldKind::Struct(pair_schema())))
            .field("name", FieldKind::String)
    }

    fn sample_bytes() -> Vec<u8> {
        let mut buf = vec![9u8];
        buf.extend_from_slice(&513u16.to_le_bytes());
        buf.extend_from_slice(&70_000u32.to_le_bytes());
        buf.push(1);
        buf.extend_from_slice(&[7u8; 32]);
        buf.push(1);
        buf.extend_from_slice(&42u64.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        for (amount, length) in [(1u64, 2u64), (3, 4)] {
            buf.extend_from_slice(&amount.to_le_bytes());
            buf.extend_from_slice(&length.to_le_bytes());
        }
        buf.extend_from_slice(&5u32.to_le_bytes());
        buf.extend_from_slice(b"whale");
        buf
    }

    #[test]
    fn decodes_every_field_kind() {
        let buf = sample_bytes();
        let (record, consumed) = decode_prefix(&sample_schema(), &buf).unwrap();

        assert_eq!(consumed, buf.len());
        assert_eq!(record.u8("key").unwrap(), 9);
        assert_eq!(record.u16("order").unwrap(), 513);
        assert_eq!(record.uint("count").unwrap(), 70_000);
        assert!(record.bool("flag").unwrap());
        assert_eq!(record.address("owner").unwrap(), [7u8; 32]);
        assert_eq!(record.option("tick").unwrap(), Some(&Value::Uint(42)));
        let ranges = record.array("ranges").unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].as_record().unwrap().uint("length").unwrap(), 4);
        assert_eq!(record.string("name").unwrap(), "whale");
    }

    #[test]
    fn absent_option_skips_payload() {
        let schema = Schema::new()
            .field("tick", FieldKind::option(FieldKind::U64))
            .field("after", FieldKind::U8);
        let record = decode(&schema, &[0, 5]).unwrap();

        assert_eq!(record.option("tick").unwrap(), None);
        assert_eq!(record.u8("after").unwrap(), 5);
    }

    #[test]
    fn short_buffer_is_truncated_before_reading() {
        let schema = Schema::new()
            .field("key", FieldKind::U8)
            .field("owner", FieldKind::Address);

        assert_eq!(
            decode(&schema, &[1u8; 20]),
            Err(DecodeError::TruncatedBuffer {
                needed: 33,
                available: 20
            })
        );
    }

    #[test]
    fn truncated_inside_variable_part() {
        let schema = Schema::new().field("tick", FieldKind::option(FieldKind::U64));
        assert!(matches!(
            decode(&schema, &[1, 0, 0]),
            Err(DecodeError::TruncatedBuffer { needed: 9, available: 3 })
        ));
    }

    #[test]
    fn oversized_vec_count_is_rejected_without_allocating() {
        let schema = Schema::new().field("ranges", FieldKind::vec(FieldKind::Struct(pair_schema())));
        let buf = u32::MAX.to_le_bytes();
        assert!(matches!(
            decode(&schema, &buf),
            Err(DecodeError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn invalid_utf8_string() {
        let schema = Schema::new().field("name", FieldKind::String);
        let mut buf = 2u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0xff, 0xfe]);

        assert_eq!(
            decode(&schema, &buf),
            Err(DecodeError::InvalidEncoding {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn fixed_array_of_records() {
        let schema = Schema::new().field("pairs", FieldKind::array(FieldKind::Struct(pair_schema()), 2));
        let buf: Vec<u8> = (1u64..=4).flat_map(|v| v.to_le_bytes()).collect();
        let record = decode(&schema, &buf).unwrap();
        let pairs = record.array("pairs").unwrap();

        assert_eq!(pairs[0].as_record().unwrap().uint("amount").unwrap(), 1);
        assert_eq!(pairs[1].as_record().unwrap().uint("length").unwrap(), 4);
    }

    #[test]
    fn decoding_is_deterministic_and_leaves_input_alone() {
        let buf = sample_bytes();
        let before = buf.clone();

        let first = decode(&sample_schema(), &buf).unwrap();
        let second = decode(&sample_schema(), &buf).unwrap();

        assert_eq!(first, second);
        assert_eq!(buf, before);
    }
}
