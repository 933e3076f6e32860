//! # Core Domain Entities
//!
//! Chain-level identities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Chain**: `Height`, `BlockHeader`
//! - **Consensus**: `Address`, `PublicKey`, `Validator`, `ValidatorSet`

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{base64::Base64, serde_as, DisplayFromStr};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{AddressError, ValidatorSetError};

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A finalized state version. Height 0 is the genesis state.
pub type Height = u64;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Header fields the application sees when a block begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Chain the block belongs to.
    pub chain_id: String,
    /// Height of the block being started.
    pub height: Height,
    /// Block time as agreed by consensus.
    pub time: DateTime<Utc>,
}

impl BlockHeader {
    pub fn new(chain_id: impl Into<String>, height: Height, time: DateTime<Utc>) -> Self {
        Self {
            chain_id: chain_id.into(),
            height,
            time,
        }
    }
}

// =============================================================================
// CLUSTER B: CONSENSUS
// =============================================================================

/// Length of a validator address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte validator address, rendered as uppercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Derive the address owned by a public key: first 20 bytes of SHA-256.
    pub fn from_pub_key(pub_key: &PublicKey) -> Self {
        let digest = Sha256::digest(&pub_key.value);
        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(address)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|e| AddressError::InvalidHex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let raw: [u8; ADDRESS_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(raw))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A consensus public key as supplied by the signing provider.
///
/// The key bytes are opaque here; only the type tag and raw value travel.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde_as(as = "Base64")]
    pub value: Vec<u8>,
}

impl PublicKey {
    pub const ED25519: &'static str = "tendermint/PubKeyEd25519";

    pub fn ed25519(value: [u8; 32]) -> Self {
        Self {
            key_type: Self::ED25519.to_string(),
            value: value.to_vec(),
        }
    }

    pub fn address(&self) -> Address {
        Address::from_pub_key(self)
    }
}

/// One consensus participant.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub pub_key: PublicKey,
    /// Voting power. Must be positive inside a `ValidatorSet`.
    #[serde_as(as = "DisplayFromStr")]
    pub power: i64,
    #[serde(default)]
    pub name: String,
}

impl Validator {
    /// Build a validator whose address is derived from its key.
    pub fn new(pub_key: PublicKey, power: i64, name: impl Into<String>) -> Self {
        Self {
            address: pub_key.address(),
            pub_key,
            power,
            name: name.into(),
        }
    }
}

/// Validators at one height, ordered by descending power with the address as
/// tie-break.
///
/// `new` enforces positive power, address uniqueness and a total power that
/// fits in `i64`. Decoding accepts the list as written so a genesis file
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(mut validators: Vec<Validator>) -> Result<Self, ValidatorSetError> {
        let mut seen = BTreeSet::new();
        let mut total: i64 = 0;
        for validator in &validators {
            if validator.power <= 0 {
                return Err(ValidatorSetError::NonPositivePower {
                    address: validator.address,
                    power: validator.power,
                });
            }
            if !seen.insert(validator.address) {
                return Err(ValidatorSetError::DuplicateAddress {
                    address: validator.address,
                });
            }
            total = total
                .checked_add(validator.power)
                .ok_or(ValidatorSetError::TotalPowerOverflow)?;
        }

        validators.sort_by(|a, b| {
            b.power
                .cmp(&a.power)
                .then_with(|| a.address.cmp(&b.address))
        });

        Ok(Self { validators })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Validator> {
        self.validators.iter()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn into_inner(self) -> Vec<Validator> {
        self.validators
    }

    pub fn get(&self, address: &Address) -> Option<&Validator> {
        self.validators.iter().find(|v| &v.address == address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.get(address).is_some()
    }

    /// Sum of all voting power, `None` if it overflows `i64`.
    pub fn total_power(&self) -> Option<i64> {
        self.validators
            .iter()
            .try_fold(0i64, |total, v| total.checked_add(v.power))
    }
}

impl<'a> IntoIterator for &'a ValidatorSet {
    type Item = &'a Validator;
    type IntoIter = std::slice::Iter<'a, Validator>;

    fn into_iter(self) -> Self::IntoIter {
        self.validators.iter()
    }
}
