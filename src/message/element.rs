//! Message element variants.
//!
//! Every variant is a plain value record. Wire names are spelled out next to
//! each field in its `wire_record!` table, the single place a field's wire
//! key is defined. `Poke` is written by hand for its legacy alias.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{
    chain::MessageChain,
    error::DecodeError,
    fields::{FieldWriter, Fields},
    id::Id,
    kinds::{MusicShareKind, PokeMethod},
    options::CodecOptions,
    registry::Registry,
};

/// A record with a fixed wire shape.
///
/// Implemented by every element variant and by [`ForwardNode`]. The set of
/// implementors is closed.
pub(crate) trait WireRecord: Sized {
    /// Discriminator tag; for untagged records, the label used in errors.
    const TAG: &'static str;

    fn decode_fields(fields: &Fields<'_>) -> Result<Self, DecodeError>;

    /// Writes every field except the tag, in wire order.
    fn encode_fields(&self, out: &mut FieldWriter<'_>);
}

/// One tagged unit of message content.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Plain(Plain),
    Source(Source),
    Quote(Quote),
    At(At),
    AtAll(AtAll),
    Face(Face),
    MarketFace(MarketFace),
    Xml(Xml),
    Json(Json),
    App(App),
    Poke(Poke),
    Dice(Dice),
    MusicShare(MusicShare),
    Forward(Forward),
    File(File),
    MiraiCode(MiraiCode),
    Image(Image),
    FlashImage(FlashImage),
    Voice(Voice),
    /// Only produced under
    /// [`UnknownElementPolicy::Passthrough`](super::UnknownElementPolicy::Passthrough).
    Unknown(UnknownElement),
}

impl Element {
    pub fn tag(&self) -> &str {
        match self {
            Element::Plain(_) => Plain::TAG,
            Element::Source(_) => Source::TAG,
            Element::Quote(_) => Quote::TAG,
            Element::At(_) => At::TAG,
            Element::AtAll(_) => AtAll::TAG,
            Element::Face(_) => Face::TAG,
            Element::MarketFace(_) => MarketFace::TAG,
            Element::Xml(_) => Xml::TAG,
            Element::Json(_) => Json::TAG,
            Element::App(_) => App::TAG,
            Element::Poke(_) => Poke::TAG,
            Element::Dice(_) => Dice::TAG,
            Element::MusicShare(_) => MusicShare::TAG,
            Element::Forward(_) => Forward::TAG,
            Element::File(_) => File::TAG,
            Element::MiraiCode(_) => MiraiCode::TAG,
            Element::Image(_) => Image::TAG,
            Element::FlashImage(_) => FlashImage::TAG,
            Element::Voice(_) => Voice::TAG,
            Element::Unknown(unknown) => &unknown.tag,
        }
    }

    pub fn decode(raw: &Value) -> Result<Self, DecodeError> {
        Registry::global().decode(raw, &CodecOptions::default())
    }

    pub fn decode_with(raw: &Value, opts: &CodecOptions) -> Result<Self, DecodeError> {
        Registry::global().decode(raw, opts)
    }

    pub fn encode(&self) -> Value {
        self.encode_with(&CodecOptions::default())
    }

    pub fn encode_with(&self, opts: &CodecOptions) -> Value {
        match self {
            Element::Plain(e) => encode_record(e, opts),
            Element::Source(e) => encode_record(e, opts),
            Element::Quote(e) => encode_record(e, opts),
            Element::At(e) => encode_record(e, opts),
            Element::AtAll(e) => encode_record(e, opts),
            Element::Face(e) => encode_record(e, opts),
            Element::MarketFace(e) => encode_record(e, opts),
            Element::Xml(e) => encode_record(e, opts),
            Element::Json(e) => encode_record(e, opts),
            Element::App(e) => encode_record(e, opts),
            Element::Poke(e) => encode_record(e, opts),
            Element::Dice(e) => encode_record(e, opts),
            Element::MusicShare(e) => encode_record(e, opts),
            Element::Forward(e) => encode_record(e, opts),
            Element::File(e) => encode_record(e, opts),
            Element::MiraiCode(e) => encode_record(e, opts),
            Element::Image(e) => encode_record(e, opts),
            Element::FlashImage(e) => encode_record(e, opts),
            Element::Voice(e) => encode_record(e, opts),
            Element::Unknown(e) => Value::Object(e.raw.clone()),
        }
    }
}

fn encode_record<R: WireRecord>(record: &R, opts: &CodecOptions) -> Value {
    let mut out = FieldWriter::tagged(R::TAG, opts);
    record.encode_fields(&mut out);
    out.finish()
}

/// Uses [`CodecOptions::default`]; see [`Element::encode_with`].
impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

/// Uses [`CodecOptions::default`], so timestamps are read as seconds and
/// unknown tags are rejected; see [`Element::decode_with`].
impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Element::decode(&raw).map_err(serde::de::Error::custom)
    }
}

macro_rules! into_element {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Element {
                fn from(value: $variant) -> Self {
                    Element::$variant(value)
                }
            }
        )+
    };
}

into_element!(
    Plain, Source, Quote, At, AtAll, Face, MarketFace, Xml, Json, App, Poke, Dice, MusicShare,
    Forward, File, MiraiCode, Image, FlashImage, Voice,
);

/// Declares a record struct together with its [`WireRecord`] impl.
///
/// Each field names its wire key; fields are written in declaration order.
/// Optional fields are typed `Option<_>`.
macro_rules! wire_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident => $tag:literal {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident: $ty:ty = $key:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )+
        }

        impl WireRecord for $name {
            const TAG: &'static str = $tag;

            fn decode_fields(f: &Fields<'_>) -> Result<Self, DecodeError> {
                Ok(Self {
                    $($field: f.read($key)?,)+
                })
            }

            fn encode_fields(&self, out: &mut FieldWriter<'_>) {
                $(out.write($key, &self.$field);)+
            }
        }
    };
}

// ============================================================================
// Text & identity
// ============================================================================

wire_record! {
    /// Plain text.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Plain => "Plain" {
        pub text: String = "text",
    }
}

impl Plain {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

wire_record! {
    /// Identity of a message within its conversation, plus its send time.
    ///
    /// By convention the first element of a received chain.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Source => "Source" {
        pub id: Id = "id",
        pub time: DateTime<Utc> = "time",
    }
}

wire_record! {
    /// A reply, carrying the full chain of the message it quotes.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Quote => "Quote" {
        pub id: Id = "id",
        /// `0` for private conversations.
        pub group_id: Id = "groupId",
        pub sender_id: Id = "senderId",
        pub target_id: Id = "targetId",
        pub origin: MessageChain = "origin",
    }
}

// ============================================================================
// Mentions & reactions
// ============================================================================

wire_record! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct At => "At" {
        pub target: Id = "target",
        pub display: Option<String> = "display",
    }
}

impl At {
    pub fn new(target: impl Into<Id>) -> Self {
        Self {
            target: target.into(),
            display: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtAll;

impl WireRecord for AtAll {
    const TAG: &'static str = "AtAll";

    fn decode_fields(_f: &Fields<'_>) -> Result<Self, DecodeError> {
        Ok(AtAll)
    }

    fn encode_fields(&self, _out: &mut FieldWriter<'_>) {}
}

wire_record! {
    /// Built-in emoticon. Either identifier may be missing.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Face => "Face" {
        pub face_id: Option<i64> = "faceId",
        pub name: Option<String> = "name",
    }
}

wire_record! {
    /// Store-bought sticker.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MarketFace => "MarketFace" {
        pub id: Id = "id",
        pub name: String = "name",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poke {
    pub method: PokeMethod,
}

impl WireRecord for Poke {
    const TAG: &'static str = "Poke";

    fn decode_fields(f: &Fields<'_>) -> Result<Self, DecodeError> {
        // Older payloads carry the method under `name`.
        let key = if !f.has("method") && f.has("name") {
            "name"
        } else {
            "method"
        };
        Ok(Self {
            method: f.read(key)?,
        })
    }

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.write("method", &self.method);
    }
}

wire_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Dice => "Dice" {
        pub value: i64 = "value",
    }
}

// ============================================================================
// Rich content
// ============================================================================

wire_record! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Xml => "Xml" {
        pub xml: String = "xml",
    }
}

wire_record! {
    /// Raw JSON card. The text travels under the wire key `json`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Json => "Json" {
        pub content: String = "json",
    }
}

impl Json {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

wire_record! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct App => "App" {
        pub content: String = "content",
    }
}

wire_record! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MusicShare => "MusicShare" {
        pub kind: MusicShareKind = "kind",
        pub title: Option<String> = "title",
        pub summary: Option<String> = "summary",
        pub jump_url: Option<String> = "jumpUrl",
        pub picture_url: Option<String> = "pictureUrl",
        pub music_url: Option<String> = "musicUrl",
        pub brief: Option<String> = "brief",
    }
}

impl MusicShare {
    pub fn new(kind: MusicShareKind) -> Self {
        Self {
            kind,
            title: None,
            summary: None,
            jump_url: None,
            picture_url: None,
            music_url: None,
            brief: None,
        }
    }
}

wire_record! {
    /// Escape-coded text, kept opaque.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MiraiCode => "MiraiCode" {
        pub code: String = "code",
    }
}

// ============================================================================
// Forwarded conversations
// ============================================================================

wire_record! {
    /// A bundle of forwarded messages.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Forward => "Forward" {
        pub node_list: Vec<ForwardNode> = "nodeList",
    }
}

wire_record! {
    /// One message inside a [`Forward`]. Not an element: it has no `type` tag.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ForwardNode => "ForwardNode" {
        /// Decides the avatar shown for the node.
        pub sender_id: Id = "senderId",
        pub time: DateTime<Utc> = "time",
        pub sender_name: String = "senderName",
        pub message_chain: Option<MessageChain> = "messageChain",
        /// Id of a cached message this node stands for.
        pub message_id: Option<Id> = "messageId",
    }
}

// ============================================================================
// Files & multimedia
// ============================================================================

wire_record! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct File => "File" {
        pub id: String = "id",
        pub name: String = "name",
        /// Bytes.
        pub size: i64 = "size",
    }
}

// Media locators: usually one of url/path/base64 is set; none is required.

wire_record! {
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Image => "Image" {
        pub image_id: Option<String> = "imageId",
        pub url: Option<String> = "url",
        pub path: Option<String> = "path",
        pub base64: Option<String> = "base64",
    }
}

impl Image {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

wire_record! {
    /// Self-destructing image; same shape as [`Image`].
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct FlashImage => "FlashImage" {
        pub image_id: Option<String> = "imageId",
        pub url: Option<String> = "url",
        pub path: Option<String> = "path",
        pub base64: Option<String> = "base64",
    }
}

wire_record! {
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Voice => "Voice" {
        pub voice_id: Option<String> = "voiceId",
        pub url: Option<String> = "url",
        pub path: Option<String> = "path",
        pub base64: Option<String> = "base64",
        /// Seconds.
        pub length: Option<i64> = "length",
    }
}

/// An element with an unrecognised tag, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownElement {
    pub tag: String,
    /// The whole wire object, `type` included.
    pub raw: Map<String, Value>,
}
