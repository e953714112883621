//! Tag dispatch for element decoding.
//!
//! The table is built once on first use and never changes afterwards, so it
//! is shared freely across threads.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::warn;

use super::{
    element::*,
    error::{DecodeError, ErrorKind, mismatch},
    fields::{DecodeContext, Fields},
    options::{CodecOptions, UnknownElementPolicy},
};

type DecodeFn = fn(&Fields<'_>) -> Result<Element, DecodeError>;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::build);

macro_rules! element_table {
    ($($variant:ident),+ $(,)?) => {
        const ELEMENT_TAGS: &[&str] = &[$(<$variant as WireRecord>::TAG),+];

        fn decoders() -> HashMap<&'static str, DecodeFn> {
            let mut table: HashMap<&'static str, DecodeFn> =
                HashMap::with_capacity(ELEMENT_TAGS.len());
            $(
                table.insert(<$variant as WireRecord>::TAG, |fields| {
                    <$variant as WireRecord>::decode_fields(fields).map(Element::$variant)
                });
            )+
            table
        }
    };
}

element_table!(
    Plain, Source, Quote, At, AtAll, Face, MarketFace, Xml, Json, App, Poke, Dice, MusicShare,
    Forward, File, MiraiCode, Image, FlashImage, Voice,
);

/// Maps discriminator tags to variant decoders.
pub struct Registry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl Registry {
    fn build() -> Self {
        Self {
            decoders: decoders(),
        }
    }

    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// The fixed tag set, in declaration order.
    pub fn tags(&self) -> &'static [&'static str] {
        ELEMENT_TAGS
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    pub fn decode(&self, raw: &Value, opts: &CodecOptions) -> Result<Element, DecodeError> {
        self.decode_at(raw, DecodeContext::root(opts))
    }

    pub fn encode(&self, element: &Element, opts: &CodecOptions) -> Value {
        element.encode_with(opts)
    }

    pub(crate) fn decode_at(
        &self,
        raw: &Value,
        ctx: DecodeContext<'_>,
    ) -> Result<Element, DecodeError> {
        let map = raw
            .as_object()
            .ok_or_else(|| DecodeError::new(mismatch("object", raw)))?;

        let Some(tag) = map.get("type").and_then(Value::as_str) else {
            return Err(DecodeError::new(ErrorKind::UnknownElementKind { tag: None }));
        };

        if let Some((&tag, decode)) = self.decoders.get_key_value(tag) {
            return decode(&Fields::new(tag, map, ctx));
        }

        match ctx.opts.unknown_elements {
            UnknownElementPolicy::Reject => Err(DecodeError::new(ErrorKind::UnknownElementKind {
                tag: Some(tag.to_owned()),
            })),
            UnknownElementPolicy::Passthrough => {
                warn!(tag, "passing through unknown message element");
                Ok(Element::Unknown(UnknownElement {
                    tag: tag.to_owned(),
                    raw: map.clone(),
                }))
            }
        }
    }
}
