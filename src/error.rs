//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::rendering::ShaderStage;

/// Errors surfaced by the demo
#[derive(Debug, Error)]
pub enum Error {
    /// A shader stage was rejected by the backend
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// Stages compiled but could not be combined into a program
    #[error("shader program '{label}' failed to link:\n{log}")]
    ShaderLink { label: String, log: String },

    /// No usable GPU adapter, surface or device
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// Audio device or stream failure
    #[error("audio error: {0}")]
    Audio(String),

    /// WAV track could not be decoded
    #[error("failed to read audio track {path}: {source}")]
    Track {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Invalid parameter combination
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
