//! Source map errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceMapError {
    /// A base64 digit outside of `[0, 63]` was requested.
    #[error("Can only encode value in the range [0, 63], got {0}")]
    EncodingRange(u32),

    /// Malformed `mappings` data or an unusable section.
    #[error("{0}")]
    DecodeFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u32),

    #[error("Section offsets must be ordered and non-overlapping.")]
    SectionOrdering,

    #[error("\"{0}\" is not in the SourceMap.")]
    MissingSourceContent(String),

    #[error(
        "apply_source_map requires either an explicit source file, \
         or the source map's \"file\" property. Both were omitted."
    )]
    MissingFileForApply,

    #[error("Support for url field in sections not implemented: {0}")]
    UnsupportedSectionUrl(String),

    #[error("{0}")]
    InvalidPosition(String),

    #[error("Invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceMapError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        SourceMapError::DecodeFormat(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SourceMapError>;
