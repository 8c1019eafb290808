//! Save documents on disk.
//!
//! The format is chosen when writing; reading tells the two apart by the
//! first non-blank byte, since a JSON document always opens with `{`.

use std::path::Path;

use sim_save::{SaveDocument, json, msgpack};

use crate::tick::SimError;

/// On-disk encoding of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Pretty JSON.
    #[default]
    Json,
    /// Compact MessagePack.
    Msgpack,
}

/// Encode `doc` and write it to `path`, replacing any existing file.
///
/// # Errors
///
/// Encoding or I/O failures.
pub fn write(path: impl AsRef<Path>, doc: &SaveDocument, format: Format) -> Result<(), SimError> {
    let bytes = match format {
        Format::Json => json::encode(doc)?.into_bytes(),
        Format::Msgpack => msgpack::encode(doc)?,
    };
    std::fs::write(path.as_ref(), bytes)?;
    tracing::info!(path = %path.as_ref().display(), ?format, tick_id = doc.tick_id, "save written");
    Ok(())
}

/// Read and decode the save at `path`, in whichever format it was written.
///
/// # Errors
///
/// I/O failures, malformed documents, unsupported versions.
pub fn read(path: impl AsRef<Path>) -> Result<SaveDocument, SimError> {
    let bytes = std::fs::read(path.as_ref())?;
    let doc = match detect(&bytes) {
        Format::Json => {
            let text = String::from_utf8_lossy(&bytes);
            json::decode(&text)?
        }
        Format::Msgpack => msgpack::decode(&bytes)?,
    };
    Ok(doc)
}

fn detect(bytes: &[u8]) -> Format {
    match bytes.trim_ascii_start().first() {
        Some(b'{') => Format::Json,
        _ => Format::Msgpack,
    }
}
