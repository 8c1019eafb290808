//! Compact MessagePack saves.
//!
//! Structs are written as maps (`to_vec_named`): components are an
//! internally tagged union, which needs field names to find its tag.

use crate::document::{SaveDocument, VersionHeader, check_version};
use crate::error::SaveError;

/// Encode a document to MessagePack bytes.
///
/// # Errors
///
/// Returns [`SaveError::EncodeMsgpack`] if serialisation fails.
pub fn encode(doc: &SaveDocument) -> Result<Vec<u8>, SaveError> {
    Ok(rmp_serde::to_vec_named(doc)?)
}

/// Decode MessagePack bytes, rejecting other versions.
///
/// # Errors
///
/// Returns [`SaveError::DecodeMsgpack`] for malformed input and
/// [`SaveError::UnsupportedVersion`] for a version mismatch.
pub fn decode(bytes: &[u8]) -> Result<SaveDocument, SaveError> {
    let header: VersionHeader = rmp_serde::from_slice(bytes)?;
    check_version(header.version)?;
    Ok(rmp_serde::from_slice(bytes)?)
}
