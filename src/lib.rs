//! Ayiou Mirai
//!
//! Typed message chains for Mirai-style chat APIs: decode tagged JSON
//! elements into a closed set of Rust types and encode them back unchanged.

#![forbid(unsafe_code)]

pub mod core;
pub mod message;
pub mod prelude;

pub use message::{
    DecodeError, Element, Id, MessageChain, decode, decode_slice, decode_slice_with, decode_str,
    decode_str_with, decode_with, encode, encode_with,
};
