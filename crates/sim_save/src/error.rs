//! Save-layer error types.

/// Errors that can occur while writing or reading a save.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Failed to encode a document to JSON.
    #[error("failed to encode JSON save: {0}")]
    EncodeJson(#[source] serde_json::Error),

    /// Failed to decode a document from JSON.
    #[error("failed to decode JSON save: {0}")]
    DecodeJson(#[source] serde_json::Error),

    /// Failed to encode a document to MessagePack.
    #[error("failed to encode MessagePack save: {0}")]
    EncodeMsgpack(#[from] rmp_serde::encode::Error),

    /// Failed to decode a document from MessagePack.
    #[error("failed to decode MessagePack save: {0}")]
    DecodeMsgpack(#[from] rmp_serde::decode::Error),

    /// The document was written by an incompatible version.
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
