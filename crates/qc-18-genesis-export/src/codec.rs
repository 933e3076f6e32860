//! # Genesis Codec
//!
//! JSON encoding of `GenesisDoc`. Encoding is pretty-printed with two-space
//! indentation and refuses out-of-bound consensus parameters; decoding fills
//! the fields a genesis loader would default.

use shared_types::GenesisDoc;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::{ConfigError, ExportError};

pub struct GenesisCodec;

impl GenesisCodec {
    pub fn encode(doc: &GenesisDoc) -> Result<Vec<u8>, ExportError> {
        doc.consensus_params.validate()?;
        serde_json::to_vec_pretty(doc)
            .map_err(|e| ExportError::serialization("failed to encode genesis document", e))
    }

    pub fn decode(bytes: &[u8]) -> Result<GenesisDoc, ExportError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ExportError::serialization("failed to decode genesis document", e))
    }

    /// Read and decode a genesis file.
    ///
    /// A missing file yields `stat <path>: no such file or directory`.
    pub fn read_file(path: &Path) -> Result<GenesisDoc, ExportError> {
        let display = path.display().to_string();
        match fs::metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::MissingFile { path: display }.into());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: display,
                    reason: e.to_string(),
                }
                .into());
            }
        }

        let bytes = fs::read(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        Self::decode(&bytes).map_err(|e| match e {
            ExportError::Serialization { source, .. } => {
                ExportError::serialization(format!("failed to decode {display}"), source)
            }
            other => other,
        })
    }

    pub fn write_file(path: &Path, doc: &GenesisDoc) -> Result<(), ExportError> {
        let bytes = Self::encode(doc)?;
        fs::write(path, bytes)
            .map_err(|e| ExportError::ExportFailed(format!("write {}: {}", path.display(), e)))
    }
}
