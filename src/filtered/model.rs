//! Record model: component groups and the element types they hold

use crate::core::{error::*, hash::hash_parts, types::*};
use crate::crypto::{HashDigest, ENTROPY_LEN};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of the notary name inside the notary group
pub const NOTARY_NAME_INDEX: u32 = 0;
/// Position of the time window inside the notary group
pub const TIME_WINDOW_INDEX: u32 = 1;

/// Named, independently filterable slices of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentGroup {
    Metadata,
    Notary,
    Signatories,
    Commands,
    Inputs,
    References,
    Outputs,
}

impl ComponentGroup {
    /// Every group, in ordinal order
    pub const ALL: [ComponentGroup; 7] = [
        ComponentGroup::Metadata,
        ComponentGroup::Notary,
        ComponentGroup::Signatories,
        ComponentGroup::Commands,
        ComponentGroup::Inputs,
        ComponentGroup::References,
        ComponentGroup::Outputs,
    ];

    /// Leaf index of the group in the top-level tree
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentGroup::Metadata => "metadata",
            ComponentGroup::Notary => "notary",
            ComponentGroup::Signatories => "signatories",
            ComponentGroup::Commands => "commands",
            ComponentGroup::Inputs => "inputs",
            ComponentGroup::References => "references",
            ComponentGroup::Outputs => "outputs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|group| group.name() == name)
    }
}

impl fmt::Display for ComponentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Always-disclosed description of how a record was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub ledger_model: String,
    pub ledger_version: u32,
    /// Algorithm every tree of the record is hashed with
    pub digest_algorithm: DigestAlgorithm,
}

impl RecordMetadata {
    pub fn new(ledger_model: impl Into<String>, ledger_version: u32) -> Self {
        Self {
            ledger_model: ledger_model.into(),
            ledger_version,
            digest_algorithm: DigestAlgorithm::Sha256,
        }
    }

    pub fn with_digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }
}

/// Secret randomness from which each group's nonce entropy is derived
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySalt(#[serde(with = "hex")] [u8; 32]);

impl PrivacySalt {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Fresh salt from the operating system's random source
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Nonce digest for one component group
    pub(crate) fn group_digest(&self, algorithm: DigestAlgorithm, group: ComponentGroup) -> HashDigest {
        let derived = hash_parts(
            DigestAlgorithm::Sha256,
            &[&self.0, &group.ordinal().to_be_bytes()],
        );
        let mut entropy = [0u8; ENTROPY_LEN];
        entropy.copy_from_slice(derived.as_bytes());
        HashDigest::nonce(algorithm, entropy)
    }
}

impl fmt::Debug for PrivacySalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivacySalt(<redacted>)")
    }
}

/// Public key of a party that must sign the record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignatoryKey(#[serde(with = "hex")] pub Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(with = "hex")]
    pub data: Vec<u8>,
}

/// Pointer to an output of an earlier record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub transaction_id: Hash,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputState {
    pub contract: String,
    pub participants: Vec<SignatoryKey>,
    #[serde(with = "hex")]
    pub data: Vec<u8>,
}

/// Interval in which a record is valid; `from` is inclusive, `until` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    from: Option<DateTime<Utc>>,
    until: DateTime<Utc>,
}

impl TimeWindow {
    pub fn until(until: DateTime<Utc>) -> Self {
        Self { from: None, until }
    }

    pub fn between(from: DateTime<Utc>, until: DateTime<Utc>) -> Result<Self> {
        if from >= until {
            return Err(DisclosureError::invalid_argument(format!(
                "time window starts at {} but ends at {}",
                from, until
            )));
        }
        Ok(Self {
            from: Some(from),
            until,
        })
    }

    pub fn from_time(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn until_time(&self) -> DateTime<Utc> {
        self.until
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| instant >= from) && instant < self.until
    }
}

/// Typed content of every component group except the metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordComponents {
    pub notary_name: String,
    pub time_window: TimeWindow,
    #[serde(default)]
    pub signatories: Vec<SignatoryKey>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub inputs: Vec<StateRef>,
    #[serde(default)]
    pub references: Vec<StateRef>,
    #[serde(default)]
    pub outputs: Vec<OutputState>,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

pub(crate) fn encode_all<T: Serialize>(values: &[T]) -> Result<Vec<Vec<u8>>> {
    values.iter().map(encode).collect()
}
