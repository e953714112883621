use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nesting limit applied when no explicit one is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do with an element whose `type` is not a known tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownElementPolicy {
    /// Fail the whole chain with `UnknownElementKind`.
    #[default]
    Reject,
    /// Keep the raw object as [`Element::Unknown`](crate::message::Element::Unknown)
    /// and write it back verbatim.
    Passthrough,
}

/// Epoch unit of timestamp fields on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimestampUnit {
    pub fn epoch_to_time(self, raw: i64) -> Option<DateTime<Utc>> {
        match self {
            TimestampUnit::Seconds => DateTime::from_timestamp(raw, 0),
            TimestampUnit::Milliseconds => DateTime::from_timestamp_millis(raw),
        }
    }

    /// Sub-unit precision is dropped.
    pub fn time_to_epoch(self, time: &DateTime<Utc>) -> i64 {
        match self {
            TimestampUnit::Seconds => time.timestamp(),
            TimestampUnit::Milliseconds => time.timestamp_millis(),
        }
    }
}

/// Knobs shared by decoding and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub unknown_elements: UnknownElementPolicy,
    pub timestamp_unit: TimestampUnit,
    /// Deepest allowed chain nesting; the outermost chain is depth 0.
    pub max_depth: Option<usize>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            unknown_elements: UnknownElementPolicy::default(),
            timestamp_unit: TimestampUnit::default(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown_elements(mut self, policy: UnknownElementPolicy) -> Self {
        self.unknown_elements = policy;
        self
    }

    pub fn timestamp_unit(mut self, unit: TimestampUnit) -> Self {
        self.timestamp_unit = unit;
        self
    }

    pub fn max_depth(mut self, limit: Option<usize>) -> Self {
        self.max_depth = limit;
        self
    }
}
