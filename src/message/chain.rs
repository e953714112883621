use std::{slice, vec};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, trace};

use super::{
    element::{Element, Source},
    error::{DecodeError, ErrorKind, mismatch},
    fields::DecodeContext,
    options::CodecOptions,
    registry::Registry,
};

/// An ordered message: the unit exchanged over the wire.
///
/// Order is preserved exactly. Nothing is reordered, merged, or dropped on
/// either decode or encode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageChain(Vec<Element>);

impl MessageChain {
    /// Wraps already-typed elements as-is.
    pub fn new(elements: Vec<Element>) -> Self {
        Self(elements)
    }

    pub fn decode(raw: &Value) -> Result<Self, DecodeError> {
        Self::decode_with(raw, &CodecOptions::default())
    }

    pub fn decode_with(raw: &Value, opts: &CodecOptions) -> Result<Self, DecodeError> {
        let chain = decode_at(raw, DecodeContext::root(opts))?;
        debug!(elements = chain.len(), "decoded message chain");
        Ok(chain)
    }

    pub fn encode(&self) -> Value {
        self.encode_with(&CodecOptions::default())
    }

    pub fn encode_with(&self, opts: &CodecOptions) -> Value {
        Value::Array(self.0.iter().map(|e| e.encode_with(opts)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.0.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Element> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Element> {
        self.0
    }

    /// The message's `Source`, wherever it sits in the chain.
    pub fn source(&self) -> Option<&Source> {
        self.0.iter().find_map(|e| match e {
            Element::Source(source) => Some(source),
            _ => None,
        })
    }
}

/// Decodes a chain nested `ctx.depth` levels below the outermost one.
pub(crate) fn decode_at(raw: &Value, ctx: DecodeContext<'_>) -> Result<MessageChain, DecodeError> {
    if let Some(limit) = ctx.opts.max_depth {
        if ctx.depth > limit {
            return Err(DecodeError::new(ErrorKind::DepthLimitExceeded { limit }));
        }
    }

    let items = raw
        .as_array()
        .ok_or_else(|| DecodeError::new(mismatch("array", raw)))?;

    let registry = Registry::global();
    let mut elements = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let element = registry
            .decode_at(item, ctx)
            .map_err(|e| e.at_index(index))?;
        trace!(index, depth = ctx.depth, tag = element.tag(), "decoded element");
        elements.push(element);
    }

    Ok(MessageChain(elements))
}

impl From<Vec<Element>> for MessageChain {
    fn from(elements: Vec<Element>) -> Self {
        Self(elements)
    }
}

impl FromIterator<Element> for MessageChain {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MessageChain {
    type Item = Element;
    type IntoIter = vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageChain {
    type Item = &'a Element;
    type IntoIter = slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Always encodes with [`CodecOptions::default`], so timestamps are written
/// in seconds. Use [`MessageChain::encode_with`] for other options.
impl Serialize for MessageChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

/// Always decodes with [`CodecOptions::default`]: millisecond timestamps are
/// read as seconds and unknown tags are rejected. Payloads using other
/// conventions should go through [`MessageChain::decode_with`].
impl<'de> Deserialize<'de> for MessageChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        MessageChain::decode(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;

    use super::*;
    use crate::message::{
        At, AtAll, Forward, ForwardNode, Id, Plain, Quote, TimestampUnit, UnknownElementPolicy,
    };

    fn quote(origin: MessageChain) -> Element {
        Element::Quote(Quote {
            id: Id::from(1),
            group_id: Id::from(100),
            sender_id: Id::from(10001),
            target_id: Id::from(100),
            origin,
        })
    }

    fn plain(text: &str) -> Element {
        Element::Plain(Plain::new(text))
    }

    #[test]
    fn keeps_element_order_and_field_order() {
        let raw = json!([{ "type": "Plain", "text": "hi" }, { "type": "AtAll" }]);
        let chain = MessageChain::decode(&raw).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.get(0), Some(&plain("hi")));
        assert_eq!(chain.get(1), Some(&Element::AtAll(AtAll)));
        assert_eq!(
            serde_json::to_string(&chain.encode()).unwrap(),
            r#"[{"type":"Plain","text":"hi"},{"type":"AtAll"}]"#
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let chain: MessageChain = vec![plain("a"), plain("a"), plain("b")].into();
        let decoded = MessageChain::decode(&chain.encode()).unwrap();
        assert_eq!(decoded, chain);
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn quote_embeds_a_full_chain() {
        let raw = json!([{
            "type": "Quote",
            "id": 1,
            "groupId": 100,
            "senderId": 10001,
            "targetId": 100,
            "origin": [{ "type": "Plain", "text": "nested" }],
        }]);
        let chain = MessageChain::decode(&raw).unwrap();

        let Some(Element::Quote(quote)) = chain.get(0) else {
            panic!("expected Quote");
        };
        assert_eq!(quote.origin.len(), 1);
        assert_eq!(quote.origin.get(0), Some(&plain("nested")));
        assert_eq!(
            serde_json::to_string(&chain.encode()).unwrap(),
            serde_json::to_string(&raw).unwrap()
        );
    }

    #[test]
    fn deep_nesting_round_trips() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let node = |chain: MessageChain| ForwardNode {
            sender_id: Id::from(10002),
            time,
            sender_name: "bob".to_string(),
            message_chain: Some(chain),
            message_id: None,
        };

        // quote -> forward -> quote -> quote -> plain
        let innermost = MessageChain::new(vec![plain("bottom"), Element::At(At::new(1))]);
        let level3 = MessageChain::new(vec![quote(innermost)]);
        let level2 = MessageChain::new(vec![quote(level3)]);
        let level1 = MessageChain::new(vec![Element::Forward(Forward {
            node_list: vec![node(level2), node(MessageChain::default())],
        })]);
        let chain = MessageChain::new(vec![plain("top"), quote(level1)]);

        let encoded = chain.encode();
        let decoded = MessageChain::decode(&encoded).unwrap();
        assert_eq!(decoded, chain);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn first_failure_aborts_with_its_index() {
        let raw = json!([
            { "type": "Plain", "text": "ok" },
            { "type": "At" },
            { "type": "Bogus" },
        ]);
        let err = MessageChain::decode(&raw).unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert_eq!(err.tag(), Some("At"));
        assert_eq!(err.field(), Some("target"));
        assert_eq!(err.kind(), &ErrorKind::MissingField);
    }

    #[test]
    fn nested_failures_carry_the_full_path() {
        let raw = json!([
            { "type": "AtAll" },
            {
                "type": "Quote",
                "id": 1, "groupId": 0, "senderId": 2, "targetId": 3,
                "origin": [{ "type": "Plain" }],
            },
        ]);
        let err = MessageChain::decode(&raw).unwrap_err();
        assert_eq!(err.path().to_string(), "[1].origin[0].text");
        assert_eq!(err.index(), Some(1));
        assert_eq!(err.tag(), Some("Plain"));

        let raw = json!([{
            "type": "Quote",
            "id": 1, "groupId": 0, "senderId": 2, "targetId": 3,
            "origin": "not a chain",
        }]);
        let err = MessageChain::decode(&raw).unwrap_err();
        assert_eq!(err.path().to_string(), "[0].origin");
        assert_eq!(err.tag(), Some("Quote"));
        assert!(matches!(err.kind(), ErrorKind::TypeMismatch { expected: "array", .. }));
    }

    #[test]
    fn top_level_must_be_an_array() {
        let err = MessageChain::decode(&json!({ "type": "Plain", "text": "hi" })).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::TypeMismatch {
                expected: "array",
                found: "object",
            }
        );
        assert_eq!(err.index(), None);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut chain = MessageChain::new(vec![plain("leaf")]);
        for _ in 0..3 {
            chain = MessageChain::new(vec![quote(chain)]);
        }
        let raw = chain.encode();

        let opts = CodecOptions::new().max_depth(Some(3));
        assert_eq!(MessageChain::decode_with(&raw, &opts).unwrap(), chain);

        let opts = CodecOptions::new().max_depth(Some(2));
        let err = MessageChain::decode_with(&raw, &opts).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DepthLimitExceeded { limit: 2 });
        assert_eq!(err.path().to_string(), "[0].origin[0].origin[0].origin");

        let opts = CodecOptions::new().max_depth(None);
        assert!(MessageChain::decode_with(&raw, &opts).is_ok());
    }

    #[test]
    fn millisecond_timestamps_round_trip() {
        let opts = CodecOptions::new().timestamp_unit(TimestampUnit::Milliseconds);
        let raw = json!([{ "type": "Source", "id": 9, "time": 1_700_000_000_123_i64 }]);

        let chain = MessageChain::decode_with(&raw, &opts).unwrap();
        let source = chain.source().unwrap();
        assert_eq!(source.time.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(chain.encode_with(&opts), raw);
    }

    #[test]
    fn source_is_found_anywhere() {
        let raw = json!([
            { "type": "Plain", "text": "late source" },
            { "type": "Source", "id": 5, "time": 0 },
        ]);
        let chain = MessageChain::decode(&raw).unwrap();
        assert_eq!(chain.source().map(|s| s.id), Some(Id::from(5)));
        assert!(MessageChain::default().source().is_none());
    }

    #[test]
    fn passthrough_preserves_position() {
        let opts = CodecOptions::new().unknown_elements(UnknownElementPolicy::Passthrough);
        let raw = json!([
            { "type": "Plain", "text": "a" },
            { "type": "Markdown", "content": "**b**" },
            { "type": "Plain", "text": "c" },
        ]);
        let chain = MessageChain::decode_with(&raw, &opts).unwrap();
        let tags: Vec<_> = chain.iter().map(Element::tag).collect();
        assert_eq!(tags, ["Plain", "Markdown", "Plain"]);
        assert_eq!(chain.encode_with(&opts), raw);

        assert!(MessageChain::decode(&raw).is_err());
    }

    #[test]
    fn embeds_in_serde_models() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Incoming {
            #[serde(rename = "messageChain")]
            message_chain: MessageChain,
        }

        let text = r#"{"messageChain":[{"type":"Plain","text":"hi"},{"type":"Dice","value":3}]}"#;
        let incoming: Incoming = serde_json::from_str(text).unwrap();
        assert_eq!(incoming.message_chain.len(), 2);
        assert_eq!(serde_json::to_string(&incoming).unwrap(), text);

        let bad = r#"{"messageChain":[{"type":"Dice"}]}"#;
        assert!(serde_json::from_str::<Incoming>(bad).is_err());
    }

    #[test]
    fn serde_impls_use_default_options() {
        let text = r#"[{"type":"Source","id":9,"time":1700000000123}]"#;
        let chain: MessageChain = serde_json::from_str(text).unwrap();
        // Read as seconds, not milliseconds.
        assert_eq!(chain.source().unwrap().time.timestamp(), 1_700_000_000_123);

        let opts = CodecOptions::new().timestamp_unit(TimestampUnit::Milliseconds);
        let chain = MessageChain::decode_with(&serde_json::from_str(text).unwrap(), &opts).unwrap();
        assert_eq!(chain.source().unwrap().time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn collects_from_iterators() {
        let chain: MessageChain = ["a", "b"].into_iter().map(plain).collect();
        let texts: Vec<_> = (&chain)
            .into_iter()
            .filter_map(|e| match e {
                Element::Plain(p) => Some(p.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(chain.clone().into_inner().len(), 2);
        assert_eq!(chain.as_slice().len(), 2);
    }
}
