//! Error types.
//!
//! Only structural problems surface as errors: a malformed import payload,
//! an unknown preset identifier, an invalid custom template, or a draw call
//! that panicked. Everything recoverable (bad colors, degenerate geometry,
//! missing parameters) degrades visually instead.

use thiserror::Error;

/// Errors raised while parsing a structured override payload.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload parsed, but its top level is not an object.
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Errors raised while validating a declarative custom template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("template id must not be empty")]
    EmptyId,

    #[error("unknown geometry family `{0}`")]
    UnknownFamily(String),

    #[error("geometry family `{family}` has no input `{input}`")]
    UnknownInput { family: String, input: String },

    #[error("unknown compositing pass `{0}`")]
    UnknownPass(String),

    #[error("binding `{binding}` references undeclared parameter `{param}`")]
    UnresolvedReference { binding: String, param: String },

    #[error("binding `{binding}` references `{param}`, which is not a numeric parameter")]
    NonNumericReference { binding: String, param: String },

    #[error("parameter `{name}` is invalid: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    CustomTemplate(#[from] TemplateError),

    /// A draw function panicked. The frame is abandoned but the engine
    /// remains usable.
    #[error("template `{id}` failed: {message}")]
    TemplateFailed { id: String, message: String },

    /// The requested surface could not be created.
    #[error("surface error: {0}")]
    Surface(String),
}
