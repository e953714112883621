//! Mirai message model.
//!
//! A [`MessageChain`] is an ordered list of [`Element`]s, each tagged on the
//! wire by its `type` field. [`Quote`] and [`ForwardNode`] embed whole chains,
//! so the model is recursive.
//!
//! ```ignore
//! use serde_json::json;
//!
//! let chain = ayiou_mirai::decode(&json!([
//!     { "type": "Plain", "text": "hi" },
//!     { "type": "AtAll" },
//! ]))?;
//! assert_eq!(ayiou_mirai::encode(&chain), json!([
//!     { "type": "Plain", "text": "hi" },
//!     { "type": "AtAll" },
//! ]));
//! ```

mod chain;
mod element;
mod error;
mod fields;
mod id;
mod kinds;
mod options;
mod registry;

use serde_json::Value;

pub use chain::MessageChain;
pub use element::{
    App, At, AtAll, Dice, Element, Face, File, FlashImage, Forward, ForwardNode, Image, Json,
    MarketFace, MiraiCode, MusicShare, Plain, Poke, Quote, Source, UnknownElement, Voice, Xml,
};
pub use error::{DecodeError, ErrorKind, Path, Segment};
pub use id::Id;
pub use kinds::{MusicShareKind, PokeMethod, Token, UnknownToken};
pub use options::{CodecOptions, DEFAULT_MAX_DEPTH, TimestampUnit, UnknownElementPolicy};
pub use registry::Registry;

pub fn decode(raw: &Value) -> Result<MessageChain, DecodeError> {
    MessageChain::decode(raw)
}

pub fn decode_with(raw: &Value, opts: &CodecOptions) -> Result<MessageChain, DecodeError> {
    MessageChain::decode_with(raw, opts)
}

pub fn decode_str(text: &str) -> Result<MessageChain, DecodeError> {
    decode_str_with(text, &CodecOptions::default())
}

pub fn decode_str_with(text: &str, opts: &CodecOptions) -> Result<MessageChain, DecodeError> {
    let raw: Value = serde_json::from_str(text).map_err(DecodeError::syntax)?;
    decode_with(&raw, opts)
}

pub fn decode_slice(bytes: &[u8]) -> Result<MessageChain, DecodeError> {
    decode_slice_with(bytes, &CodecOptions::default())
}

pub fn decode_slice_with(bytes: &[u8], opts: &CodecOptions) -> Result<MessageChain, DecodeError> {
    let raw: Value = serde_json::from_slice(bytes).map_err(DecodeError::syntax)?;
    decode_with(&raw, opts)
}

pub fn encode(chain: &MessageChain) -> Value {
    chain.encode()
}

pub fn encode_with(chain: &MessageChain, opts: &CodecOptions) -> Value {
    chain.encode_with(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_entry_points_decode() {
        let chain = decode_str(r#"[{"type":"Plain","text":"hi"},{"type":"AtAll"}]"#).unwrap();
        assert_eq!(chain.len(), 2);

        let chain = decode_slice(br#"[{"type":"Json","json":"{\"a\":1}"}]"#).unwrap();
        assert_eq!(chain.get(0), Some(&Element::Json(Json::new(r#"{"a":1}"#))));
        assert_eq!(
            serde_json::to_string(&encode(&chain)).unwrap(),
            r#"[{"type":"Json","json":"{\"a\":1}"}]"#
        );
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        let err = decode_str("[{").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Syntax(_)));
    }

    #[test]
    fn unknown_tag_never_substitutes() {
        for raw in [
            r#"[{"type":"Unknown"}]"#,
            r#"[{"type":"PLAIN","text":"x"}]"#,
            r#"[{"text":"x"}]"#,
        ] {
            let err = decode_str(raw).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::UnknownElementKind { .. }),
                "{raw}: {err}"
            );
            assert_eq!(err.index(), Some(0));
        }
    }
}
