pub mod config;

pub use config::CodecConfig;
