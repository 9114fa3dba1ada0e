//! Renderings produced with external libraries rather than by libslz itself.

pub mod cbor;
pub mod toml;
pub mod yaml;
