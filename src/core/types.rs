//! Core data types for merkle_disclosure

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base hash algorithms a digest can be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// All supported algorithms
    pub const ALL: [DigestAlgorithm; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// Canonical algorithm name, e.g. `SHA-256`
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Output length in bytes
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Look up an algorithm by name; accepts `SHA-256` and `SHA256` forms
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Some(DigestAlgorithm::Sha256),
            "SHA384" => Some(DigestAlgorithm::Sha384),
            "SHA512" => Some(DigestAlgorithm::Sha512),
            _ => None,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DigestAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DigestAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        DigestAlgorithm::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported algorithm {}", name)))
    }
}

/// Digest output tagged with the algorithm that produced it
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

/// Errors raised when parsing a hash from text
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HashParseError {
    #[error("missing algorithm prefix in {0}")]
    MissingAlgorithm(String),

    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("{algorithm} digests are {expected} bytes, got {actual}")]
    WrongLength {
        algorithm: DigestAlgorithm,
        expected: usize,
        actual: usize,
    },
}

impl Hash {
    /// Create a hash from raw digest bytes
    pub fn new(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Result<Self, HashParseError> {
        if bytes.len() != algorithm.output_len() {
            return Err(HashParseError::WrongLength {
                algorithm,
                expected: algorithm.output_len(),
                actual: bytes.len(),
            });
        }
        Ok(Hash { algorithm, bytes })
    }

    /// Wrap the output of a hasher; length is guaranteed by the algorithm
    pub(crate) fn from_digest_output(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), algorithm.output_len());
        Hash { algorithm, bytes }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to hex string (without the algorithm prefix)
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Create a hash from a bare hex string for the given algorithm
    pub fn from_hex(algorithm: DigestAlgorithm, hex: &str) -> Result<Self, HashParseError> {
        Hash::new(algorithm, hex::decode(hex)?)
    }
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, hex) = s
            .split_once(':')
            .ok_or_else(|| HashParseError::MissingAlgorithm(s.to_string()))?;
        let algorithm = DigestAlgorithm::from_name(name)
            .ok_or_else(|| HashParseError::UnsupportedAlgorithm(name.to_string()))?;
        Hash::from_hex(algorithm, hex)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, hex::encode(&self.bytes))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({}:{})", self.algorithm, &hex::encode(&self.bytes)[..8])
    }
}

// Serialized as "SHA-256:<hex>" rather than a byte array
impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional byte strings carried as hex
pub(crate) mod hex_option {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| hex::decode(text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
