//! # Consensus Parameters
//!
//! Protocol-level limits that travel with every committed version and every
//! genesis document. Integers are encoded as JSON strings and the evidence
//! age as a nanosecond string, matching the Tendermint genesis format.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, DurationNanoSeconds};
use std::time::Duration;

use crate::errors::ConsensusParamsError;

/// Value meaning "no limit" for any numeric parameter.
pub const UNLIMITED: i64 = -1;

/// Minimum block time increment, in milliseconds, when a document omits it.
pub const DEFAULT_TIME_IOTA_MS: i64 = 1000;

fn default_time_iota_ms() -> i64 {
    DEFAULT_TIME_IOTA_MS
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockParams {
    #[serde_as(as = "DisplayFromStr")]
    pub max_bytes: i64,
    #[serde_as(as = "DisplayFromStr")]
    pub max_gas: i64,
    /// Owned by the consensus node, not the application.
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_time_iota_ms")]
    pub time_iota_ms: i64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceParams {
    #[serde_as(as = "DurationNanoSeconds<String>")]
    pub max_age_duration: Duration,
    #[serde_as(as = "DisplayFromStr")]
    pub max_age_num_blocks: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorParams {
    pub pub_key_types: Vec<String>,
}

/// Protocol tuning limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub block: BlockParams,
    pub evidence: EvidenceParams,
    pub validator: ValidatorParams,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            block: BlockParams {
                max_bytes: 200_000,
                max_gas: 2_000_000,
                time_iota_ms: DEFAULT_TIME_IOTA_MS,
            },
            evidence: EvidenceParams {
                max_age_duration: Duration::from_secs(504 * 60 * 60), // 3 weeks
                max_age_num_blocks: 302_400,
            },
            validator: ValidatorParams {
                pub_key_types: vec!["ed25519".to_string()],
            },
        }
    }
}

impl ConsensusParams {
    /// Check every numeric field is >= -1 and at least one key type is allowed.
    pub fn validate(&self) -> Result<(), ConsensusParamsError> {
        let numeric = [
            ("block.max_bytes", self.block.max_bytes),
            ("block.max_gas", self.block.max_gas),
            ("evidence.max_age_num_blocks", self.evidence.max_age_num_blocks),
        ];

        for (field, value) in numeric {
            if value < UNLIMITED {
                return Err(ConsensusParamsError::BelowMinimum { field, value });
            }
        }

        if self.block.time_iota_ms <= 0 {
            return Err(ConsensusParamsError::NonPositive {
                field: "block.time_iota_ms",
                value: self.block.time_iota_ms,
            });
        }

        if self.validator.pub_key_types.is_empty() {
            return Err(ConsensusParamsError::NoPubKeyTypes);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(ConsensusParams::default().validate().is_ok());
    }

    #[test]
    fn test_unlimited_is_accepted() {
        let mut params = ConsensusParams::default();
        params.block.max_bytes = UNLIMITED;
        params.block.max_gas = UNLIMITED;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_below_unlimited_is_rejected() {
        let mut params = ConsensusParams::default();
        params.block.max_gas = -2;

        assert_eq!(
            params.validate(),
            Err(ConsensusParamsError::BelowMinimum {
                field: "block.max_gas",
                value: -2
            })
        );
    }

    #[test]
    fn test_empty_key_types_rejected() {
        let mut params = ConsensusParams::default();
        params.validator.pub_key_types.clear();
        assert_eq!(params.validate(), Err(ConsensusParamsError::NoPubKeyTypes));
    }

    #[test]
    fn test_time_iota_defaults_and_must_be_positive() {
        let mut json = serde_json::to_value(ConsensusParams::default()).unwrap();
        json["block"].as_object_mut().unwrap().remove("time_iota_ms");
        let decoded: ConsensusParams = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.block.time_iota_ms, DEFAULT_TIME_IOTA_MS);

        let mut params = ConsensusParams::default();
        params.block.time_iota_ms = 0;
        assert_eq!(
            params.validate(),
            Err(ConsensusParamsError::NonPositive {
                field: "block.time_iota_ms",
                value: 0
            })
        );
    }

    #[test]
    fn test_json_encoding_uses_strings() {
        let json = serde_json::to_value(ConsensusParams::default()).unwrap();

        assert_eq!(json["block"]["max_bytes"], "200000");
        assert_eq!(json["block"]["time_iota_ms"], "1000");
        assert_eq!(json["evidence"]["max_age_duration"], "1814400000000000");
        assert_eq!(json["evidence"]["max_age_num_blocks"], "302400");
        assert_eq!(json["validator"]["pub_key_types"][0], "ed25519");
    }
}
