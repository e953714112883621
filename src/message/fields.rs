//! Field-level reading and writing for one wire object.
//!
//! Readers treat an absent key and an explicit `null` the same way: a
//! required field reports `MissingField`, an optional one yields `None`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{
    chain::{self, MessageChain},
    element::WireRecord,
    error::{DecodeError, ErrorKind, mismatch},
    id::Id,
    kinds::{MusicShareKind, PokeMethod, Token},
    options::{CodecOptions, TimestampUnit},
};

const ID: &str = "64-bit integer id";
const INTEGER: &str = "integer";
const STRING: &str = "string";
const TIMESTAMP: &str = "epoch timestamp";

/// Options plus how deep the current chain sits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeContext<'a> {
    pub(crate) opts: &'a CodecOptions,
    pub(crate) depth: usize,
}

impl<'a> DecodeContext<'a> {
    pub(crate) fn root(opts: &'a CodecOptions) -> Self {
        Self { opts, depth: 0 }
    }

    fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// A Rust type that one wire field maps to.
///
/// `Option<T>` makes any field optional: absent or `null` decodes to `None`,
/// and `None` is left out on encode.
pub(crate) trait WireValue: Sized {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError>;

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str);
}

impl WireValue for String {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        fields.require(key, read_string)
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        out.put(key, self.as_str());
    }
}

impl WireValue for i64 {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        fields.require(key, read_int)
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        out.put(key, *self);
    }
}

impl WireValue for Id {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        fields.require(key, read_id)
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        out.put(key, *self);
    }
}

impl WireValue for DateTime<Utc> {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        let unit = fields.ctx.opts.timestamp_unit;
        fields.require(key, |value| read_timestamp(value, unit))
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        let raw = out.opts.timestamp_unit.time_to_epoch(self);
        out.put(key, raw);
    }
}

impl WireValue for MessageChain {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        let raw = fields.required(key)?;
        fields.nested_chain(key, raw)
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        let raw = self.encode_with(out.opts);
        out.put(key, raw);
    }
}

/// An array of untagged records, e.g. forward nodes.
impl<R: WireRecord> WireValue for Vec<R> {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        let raw = fields.required(key)?;
        let items = raw
            .as_array()
            .ok_or_else(|| fields.fail(key, mismatch("array", raw)))?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                fields
                    .record::<R>(item)
                    .map_err(|e| e.at_index(index).at_field(key))
            })
            .collect()
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        let items: Vec<Value> = self
            .iter()
            .map(|record| {
                let mut writer = FieldWriter::untagged(out.opts);
                record.encode_fields(&mut writer);
                writer.finish()
            })
            .collect();
        out.put(key, items);
    }
}

impl<T: WireValue> WireValue for Option<T> {
    fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
        if fields.has(key) {
            T::read(fields, key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
        if let Some(value) = self {
            value.write(out, key);
        }
    }
}

macro_rules! token_values {
    ($($token:ty),+ $(,)?) => {
        $(
            impl WireValue for $token {
                fn read(fields: &Fields<'_>, key: &'static str) -> Result<Self, DecodeError> {
                    fields.require(key, read_token::<$token>)
                }

                fn write(&self, out: &mut FieldWriter<'_>, key: &'static str) {
                    out.put(key, self.as_str());
                }
            }
        )+
    };
}

token_values!(PokeMethod, MusicShareKind);

pub(crate) struct Fields<'a> {
    tag: &'static str,
    map: &'a Map<String, Value>,
    ctx: DecodeContext<'a>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(
        tag: &'static str,
        map: &'a Map<String, Value>,
        ctx: DecodeContext<'a>,
    ) -> Self {
        Self { tag, map, ctx }
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn read<T: WireValue>(&self, key: &'static str) -> Result<T, DecodeError> {
        T::read(self, key)
    }

    fn record<R: WireRecord>(&self, item: &'a Value) -> Result<R, DecodeError> {
        let map = item
            .as_object()
            .ok_or_else(|| DecodeError::new(mismatch("object", item)).with_tag(R::TAG))?;
        R::decode_fields(&Fields::new(R::TAG, map, self.ctx))
    }

    fn nested_chain(&self, key: &'static str, raw: &'a Value) -> Result<MessageChain, DecodeError> {
        chain::decode_at(raw, self.ctx.nested()).map_err(|e| {
            // Failures of the chain itself belong to the embedding record.
            let e = if e.path().is_empty() { e.with_tag(self.tag) } else { e };
            e.at_field(key)
        })
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn required(&self, key: &'static str) -> Result<&'a Value, DecodeError> {
        self.get(key)
            .ok_or_else(|| self.fail(key, ErrorKind::MissingField))
    }

    fn require<T>(
        &self,
        key: &'static str,
        read: impl Fn(&Value) -> Result<T, ErrorKind>,
    ) -> Result<T, DecodeError> {
        read(self.required(key)?).map_err(|kind| self.fail(key, kind))
    }

    fn fail(&self, key: &'static str, kind: ErrorKind) -> DecodeError {
        DecodeError::new(kind).with_tag(self.tag).at_field(key)
    }
}

fn read_string(value: &Value) -> Result<String, ErrorKind> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| mismatch(STRING, value))
}

/// Numbers are sometimes stringified upstream, so decimal strings are accepted.
fn read_int(value: &Value) -> Result<i64, ErrorKind> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(INTEGER, value)),
        Value::String(s) => s.parse().map_err(|_| mismatch(INTEGER, value)),
        _ => Err(mismatch(INTEGER, value)),
    }
}

fn read_id(value: &Value) -> Result<Id, ErrorKind> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .map(Id::from)
            .or_else(|| n.as_u64().map(Id::from)),
        Value::String(s) => s.parse::<i128>().ok().and_then(Id::new),
        _ => None,
    };
    id.ok_or_else(|| mismatch(ID, value))
}

fn read_timestamp(value: &Value, unit: TimestampUnit) -> Result<DateTime<Utc>, ErrorKind> {
    match value {
        Value::Number(n) => {
            let raw = n.as_i64().ok_or_else(|| mismatch(TIMESTAMP, value))?;
            unit.epoch_to_time(raw).ok_or(ErrorKind::TypeMismatch {
                expected: TIMESTAMP,
                found: "integer outside the timestamp range",
            })
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|_| mismatch(TIMESTAMP, value)),
        _ => Err(mismatch(TIMESTAMP, value)),
    }
}

fn read_token<T: Token>(value: &Value) -> Result<T, ErrorKind> {
    let token = value.as_str().ok_or_else(|| mismatch(STRING, value))?;
    T::from_token(token).ok_or_else(|| ErrorKind::InvalidEnumValue {
        value: token.to_owned(),
        allowed: T::TOKENS,
    })
}

/// Builds one wire object, keeping keys in insertion order.
pub(crate) struct FieldWriter<'a> {
    map: Map<String, Value>,
    opts: &'a CodecOptions,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn tagged(tag: &str, opts: &'a CodecOptions) -> Self {
        let mut writer = Self::untagged(opts);
        writer.put("type", tag);
        writer
    }

    pub(crate) fn untagged(opts: &'a CodecOptions) -> Self {
        Self {
            map: Map::new(),
            opts,
        }
    }

    pub(crate) fn write<T: WireValue>(&mut self, key: &'static str, value: &T) {
        value.write(self, key);
    }

    fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_owned(), value.into());
    }

    pub(crate) fn finish(self) -> Value {
        Value::Object(self.map)
    }
}
