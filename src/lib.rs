//! Pixel Studio - library for pixel-art editing and sprite animation
//!
//! This library provides functionality to:
//! - Slice sprite sheets and group numbered frame files into animations
//! - Draw on a square pixel canvas with undo, clipboard and move tools
//! - Play any number of animations at once on a shared view
//! - Persist animation groups and export them as strips, GIFs or images

pub mod canvas;
pub mod cli;
pub mod color;
pub mod config;
pub mod editor;
pub mod export;
pub mod fill;
pub mod frames;
pub mod group;
pub mod import;
pub mod keymap;
pub mod logging;
pub mod output;
pub mod runtime;
pub mod script;
pub mod slicer;
pub mod store;
pub mod studio;
pub mod view;
