//! Sonosphere library - audio-reactive icosphere demo

pub mod audio;
pub mod camera;
pub mod cli;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod input;
pub mod params;
pub mod rendering;
pub mod stats;

pub use error::{Error, Result};
