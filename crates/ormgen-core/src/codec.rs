//! Dynamic conversion between record values and wire messages.
//!
//! Applies the same per-field rules the generated model code encodes, over
//! untyped values, so the conversion contract can be exercised without
//! compiling generated sources.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolved::{ResolvedColumn, ResolvedSchema, ResolvedTable};
use crate::types::SemanticType;
use crate::wire::WireType;

const MICROS_PER_SECOND: f64 = 1_000_000.0;
const NANOS_PER_MICRO: u32 = 1_000;

/// Exact decimal: `unscaled * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalValue {
    pub unscaled: i128,
    pub scale: u32,
}

/// In-memory field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    ShortInt(i16),
    Int(i32),
    LongInt(i64),
    Decimal(DecimalValue),
    Float(f32),
    Double(f64),
    String(String),
    Date(NaiveDate),
    /// Carried at microsecond precision; finer values are rejected on encode.
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl Value {
    fn semantic(&self) -> Option<SemanticType> {
        match self {
            Value::Null => None,
            Value::ShortInt(_) => Some(SemanticType::ShortInt),
            Value::Int(_) => Some(SemanticType::Int),
            Value::LongInt(_) => Some(SemanticType::LongInt),
            Value::Decimal(_) => Some(SemanticType::Decimal),
            Value::Float(_) => Some(SemanticType::Float),
            Value::Double(_) => Some(SemanticType::Double),
            Value::String(_) => Some(SemanticType::String),
            Value::Date(_) => Some(SemanticType::Date),
            Value::Timestamp(_) => Some(SemanticType::Timestamp),
            Value::Bytes(_) => Some(SemanticType::Bytes),
        }
    }
}

/// Decimal payload: the 128-bit unscaled value split in two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalWire {
    pub hi: i64,
    pub lo: u64,
    pub scale: u32,
}

impl From<DecimalValue> for DecimalWire {
    fn from(value: DecimalValue) -> Self {
        Self {
            hi: (value.unscaled >> 64) as i64,
            lo: value.unscaled as u64,
            scale: value.scale,
        }
    }
}

impl From<DecimalWire> for DecimalValue {
    fn from(wire: DecimalWire) -> Self {
        Self {
            unscaled: (i128::from(wire.hi) << 64) | i128::from(wire.lo),
            scale: wire.scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWire {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Wire field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireValue {
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Decimal(DecimalWire),
    Date(DateWire),
}

/// Record instance keyed by generated field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: String,
    pub values: BTreeMap<String, Value>,
    pub related: BTreeMap<String, Record>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, field_name: impl Into<String>, value: Value) -> Self {
        self.values.insert(field_name.into(), value);
        self
    }

    pub fn with_related(mut self, field_name: impl Into<String>, record: Record) -> Self {
        self.related.insert(field_name.into(), record);
        self
    }

    /// Value of a field; fields never set read as `Null`.
    pub fn value(&self, field_name: &str) -> &Value {
        self.values.get(field_name).unwrap_or(&Value::Null)
    }
}

/// Wire message keyed by field number. Absent tags are absent fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub message_name: String,
    pub fields: BTreeMap<u32, WireValue>,
    pub messages: BTreeMap<u32, WireMessage>,
}

/// Convert a record to its wire message, recursing into loaded relationships.
pub fn to_wire(schema: &ResolvedSchema, record: &Record) -> Result<WireMessage> {
    let table = lookup(schema, &record.type_name)?;
    let mut message = WireMessage {
        message_name: table.wire_message_name(),
        ..WireMessage::default()
    };

    for column in &table.columns {
        if let Some(wire) = encode_value(column, record.value(&column.field_name))? {
            message.fields.insert(column.tag, wire);
        }
    }

    for relationship in &table.relationships {
        if let Some(related) = record.related.get(&relationship.field.field_name) {
            message
                .messages
                .insert(relationship.tag, to_wire(schema, related)?);
        }
    }

    Ok(message)
}

/// Convert a wire message back to a record.
pub fn from_wire(schema: &ResolvedSchema, message: &WireMessage) -> Result<Record> {
    let table = schema
        .tables
        .iter()
        .find(|table| table.wire_message_name() == message.message_name)
        .ok_or_else(|| {
            Error::Conversion(format!("unknown wire message: {}", message.message_name))
        })?;

    let mut record = Record::new(table.type_name.clone());
    for column in &table.columns {
        let value = decode_value(column, message.fields.get(&column.tag))?;
        record.values.insert(column.field_name.clone(), value);
    }

    for relationship in &table.relationships {
        if let Some(nested) = message.messages.get(&relationship.tag) {
            record
                .related
                .insert(relationship.field.field_name.clone(), from_wire(schema, nested)?);
        }
    }

    Ok(record)
}

fn lookup<'a>(schema: &'a ResolvedSchema, type_name: &str) -> Result<&'a ResolvedTable> {
    schema
        .table(type_name)
        .ok_or_else(|| Error::Conversion(format!("unknown record type: {type_name}")))
}

fn encode_value(column: &ResolvedColumn, value: &Value) -> Result<Option<WireValue>> {
    let expected = column.in_memory.semantic;
    match value.semantic() {
        None if column.in_memory.nullable => return Ok(None),
        None => {
            return Err(Error::Conversion(format!(
                "null value for non-null field {}",
                column.field_name
            )));
        }
        Some(actual) if actual != expected => {
            return Err(mismatch(column, &actual.to_string()));
        }
        Some(_) => {}
    }

    let wire = match value {
        Value::ShortInt(v) => WireValue::Int32(i32::from(*v)),
        Value::Int(v) => WireValue::Int32(*v),
        Value::LongInt(v) => WireValue::Int64(*v),
        Value::Decimal(v) => WireValue::Decimal(DecimalWire::from(*v)),
        Value::Float(v) => WireValue::Float(*v),
        Value::Double(v) => WireValue::Double(*v),
        Value::String(v) => WireValue::String(v.clone()),
        Value::Date(v) => WireValue::Date(DateWire {
            year: v.year(),
            month: v.month(),
            day: v.day(),
        }),
        Value::Timestamp(v) => {
            let utc = v.and_utc();
            if utc.timestamp_subsec_nanos() % NANOS_PER_MICRO != 0 {
                return Err(mismatch(column, &format!("sub-microsecond timestamp {v}")));
            }
            WireValue::Double(utc.timestamp_micros() as f64 / MICROS_PER_SECOND)
        }
        Value::Bytes(v) => WireValue::Bytes(v.clone()),
        Value::Null => return Ok(None),
    };

    Ok(Some(wire))
}

fn decode_value(column: &ResolvedColumn, wire: Option<&WireValue>) -> Result<Value> {
    let Some(wire) = wire else {
        return match column.wire {
            WireType::Scalar(_) => Ok(zero_value(column.in_memory.semantic)),
            _ if column.in_memory.nullable => Ok(Value::Null),
            _ => Err(Error::Conversion(format!(
                "missing value for non-null field {}",
                column.field_name
            ))),
        };
    };

    let value = match (column.in_memory.semantic, wire) {
        (SemanticType::ShortInt, WireValue::Int32(v)) => Value::ShortInt(
            i16::try_from(*v).map_err(|_| mismatch(column, &format!("out-of-range {v}")))?,
        ),
        (SemanticType::Int, WireValue::Int32(v)) => Value::Int(*v),
        (SemanticType::LongInt, WireValue::Int64(v)) => Value::LongInt(*v),
        (SemanticType::Decimal, WireValue::Decimal(v)) => Value::Decimal(DecimalValue::from(*v)),
        (SemanticType::Float, WireValue::Float(v)) => Value::Float(*v),
        (SemanticType::Double, WireValue::Double(v)) => Value::Double(*v),
        (SemanticType::String, WireValue::String(v)) => Value::String(v.clone()),
        (SemanticType::Bytes, WireValue::Bytes(v)) => Value::Bytes(v.clone()),
        (SemanticType::Date, WireValue::Date(v)) => Value::Date(
            NaiveDate::from_ymd_opt(v.year, v.month, v.day)
                .ok_or_else(|| mismatch(column, "invalid date"))?,
        ),
        (SemanticType::Timestamp, WireValue::Double(v)) => {
            Value::Timestamp(timestamp_from_seconds(*v).ok_or_else(|| {
                mismatch(column, &format!("out-of-range timestamp {v}"))
            })?)
        }
        (_, other) => return Err(mismatch(column, &format!("{other:?}"))),
    };

    Ok(value)
}

/// Value read for an implicit-presence scalar that is absent on the wire.
fn zero_value(semantic: SemanticType) -> Value {
    match semantic {
        SemanticType::ShortInt => Value::ShortInt(0),
        SemanticType::Int => Value::Int(0),
        SemanticType::LongInt => Value::LongInt(0),
        SemanticType::Decimal => Value::Decimal(DecimalValue {
            unscaled: 0,
            scale: 0,
        }),
        SemanticType::Float => Value::Float(0.0),
        SemanticType::Double => Value::Double(0.0),
        SemanticType::String => Value::String(String::new()),
        SemanticType::Date => Value::Date(NaiveDate::default()),
        SemanticType::Timestamp => Value::Timestamp(NaiveDateTime::default()),
        SemanticType::Bytes => Value::Bytes(Vec::new()),
    }
}

fn timestamp_from_seconds(seconds: f64) -> Option<NaiveDateTime> {
    let micros = (seconds * MICROS_PER_SECOND).round();
    if !micros.is_finite() || micros.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64).map(|value| value.naive_utc())
}

fn mismatch(column: &ResolvedColumn, found: &str) -> Error {
    Error::Conversion(format!(
        "field {} expects {}, found {found}",
        column.field_name, column.in_memory.semantic
    ))
}
