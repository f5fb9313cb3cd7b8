//! Configuration module for pixelstudio
//!
//! Provides types and parsing for `pixelstudio.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
