//! Pretty-printed JSON saves, the self-describing format.

use crate::document::{SaveDocument, VersionHeader, check_version};
use crate::error::SaveError;

/// Encode a document as pretty JSON.
///
/// # Errors
///
/// Returns [`SaveError::EncodeJson`] if serialisation fails.
pub fn encode(doc: &SaveDocument) -> Result<String, SaveError> {
    serde_json::to_string_pretty(doc).map_err(SaveError::EncodeJson)
}

/// Decode a JSON document, rejecting other versions.
///
/// # Errors
///
/// Returns [`SaveError::DecodeJson`] for malformed input and
/// [`SaveError::UnsupportedVersion`] for a version mismatch.
pub fn decode(text: &str) -> Result<SaveDocument, SaveError> {
    let header: VersionHeader = serde_json::from_str(text).map_err(SaveError::DecodeJson)?;
    check_version(header.version)?;
    serde_json::from_str(text).map_err(SaveError::DecodeJson)
}
