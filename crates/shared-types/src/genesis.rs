//! # Genesis Document
//!
//! The declarative description of a chain's starting point, plus the
//! transient `ExportedApp` the export pipeline produces before a document is
//! assembled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::app_state::AppState;
use crate::consensus::ConsensusParams;
use crate::entities::{Height, ValidatorSet};
use crate::errors::{GenesisError, ValidatorSetError};

/// Maximum chain id length accepted by consensus.
pub const MAX_CHAIN_ID_LEN: usize = 50;

fn default_initial_height() -> Height {
    1
}

/// Chain-start description. Immutable once produced.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDoc {
    pub chain_id: String,
    pub genesis_time: DateTime<Utc>,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_initial_height")]
    pub initial_height: Height,
    #[serde(default)]
    pub consensus_params: ConsensusParams,
    #[serde(default)]
    pub validators: ValidatorSet,
    #[serde(default)]
    pub app_state: AppState,
}

impl GenesisDoc {
    /// Structural checks a node performs before starting from this document.
    pub fn validate_basic(&self) -> Result<(), GenesisError> {
        if self.chain_id.is_empty() {
            return Err(GenesisError::EmptyChainId);
        }
        if self.chain_id.len() > MAX_CHAIN_ID_LEN {
            return Err(GenesisError::ChainIdTooLong {
                len: self.chain_id.len(),
                max: MAX_CHAIN_ID_LEN,
            });
        }

        self.consensus_params.validate()?;

        if let Some(v) = self.validators.iter().find(|v| v.power <= 0) {
            return Err(ValidatorSetError::NonPositivePower {
                address: v.address,
                power: v.power,
            }
            .into());
        }

        Ok(())
    }
}

/// Result of one export call. Never persisted; the caller decides where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedApp {
    pub app_state: AppState,
    pub validators: ValidatorSet,
    /// Height the restarted chain starts from.
    pub height: Height,
    pub consensus_params: ConsensusParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PublicKey, Validator};
    use chrono::TimeZone;

    fn doc() -> GenesisDoc {
        GenesisDoc {
            chain_id: "theChainId".into(),
            genesis_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            initial_height: 1,
            consensus_params: ConsensusParams::default(),
            validators: ValidatorSet::new(vec![Validator::new(
                PublicKey::ed25519([1; 32]),
                10,
                "v1",
            )])
            .unwrap(),
            app_state: AppState::new(),
        }
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let json = r#"{"chain_id":"c","genesis_time":"2024-01-01T00:00:00Z"}"#;
        let decoded: GenesisDoc = serde_json::from_str(json).unwrap();

        assert_eq!(decoded.initial_height, 1);
        assert_eq!(decoded.consensus_params, ConsensusParams::default());
        assert!(decoded.validators.is_empty());
        assert!(decoded.app_state.is_empty());
    }

    #[test]
    fn test_initial_height_is_a_string() {
        let json = serde_json::to_value(doc()).unwrap();
        assert_eq!(json["initial_height"], "1");
    }

    #[test]
    fn test_validate_basic() {
        assert!(doc().validate_basic().is_ok());

        let mut empty = doc();
        empty.chain_id.clear();
        assert_eq!(empty.validate_basic(), Err(GenesisError::EmptyChainId));

        let mut long = doc();
        long.chain_id = "x".repeat(MAX_CHAIN_ID_LEN + 1);
        assert!(matches!(
            long.validate_basic(),
            Err(GenesisError::ChainIdTooLong { .. })
        ));

        let mut bad_params = doc();
        bad_params.consensus_params.block.max_bytes = -5;
        assert!(matches!(
            bad_params.validate_basic(),
            Err(GenesisError::ConsensusParams(_))
        ));
    }
}
