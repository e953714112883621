// Convenience re-exports: use ayiou_mirai::prelude::*;
pub use crate::core::CodecConfig;

pub use crate::message::{
    At, AtAll, CodecOptions, DecodeError, Element, ErrorKind, Face, Forward, ForwardNode, Id,
    Image, Json, MessageChain, Plain, Poke, PokeMethod, Quote, Source, TimestampUnit,
    UnknownElementPolicy,
};
