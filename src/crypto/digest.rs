//! Hash digest configuration values
//!
//! A [`HashDigest`] names a provider, a base algorithm and the provider's
//! options. Required options are checked when the value is created, so a digest
//! that exists can always hash.

use crate::core::{error::*, types::*};
use crate::crypto::provider::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PROVIDER: &str = "Default";
pub const NONCE_PROVIDER: &str = "Nonce";
pub const NONCE_VERIFY_PROVIDER: &str = "NonceVerify";
pub const NONCE_SIZE_ONLY_VERIFY_PROVIDER: &str = "NonceSizeOnlyVerify";
pub const TWEAKABLE_PROVIDER: &str = "Tweakable";

pub const ENTROPY_OPTION: &str = "entropy";
pub const LEAF_PREFIX_OPTION: &str = "leafPrefix";
pub const NODE_PREFIX_OPTION: &str = "nodePrefix";

/// Option values accepted by digest providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DigestOption {
    Integer(i64),
    Bytes(#[serde(with = "hex")] Vec<u8>),
}

impl From<Vec<u8>> for DigestOption {
    fn from(bytes: Vec<u8>) -> Self {
        DigestOption::Bytes(bytes)
    }
}

impl From<&[u8]> for DigestOption {
    fn from(bytes: &[u8]) -> Self {
        DigestOption::Bytes(bytes.to_vec())
    }
}

impl From<i64> for DigestOption {
    fn from(value: i64) -> Self {
        DigestOption::Integer(value)
    }
}

/// Serialized form of a digest: `(provider, algorithm, options)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigestSpec {
    pub provider: String,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, DigestOption>,
}

/// A fully validated digest configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HashDigestSpec", into = "HashDigestSpec")]
pub enum HashDigest {
    Default(DefaultDigest),
    Nonce(NonceDigest),
    NonceVerify(NonceVerifyDigest),
    NonceSizeOnlyVerify(NonceSizeOnlyVerifyDigest),
    Tweakable(TweakableDigest),
}

fn bytes_option<'a>(
    options: &'a BTreeMap<String, DigestOption>,
    provider: &str,
    name: &str,
) -> Result<&'a [u8]> {
    match options.get(name) {
        Some(DigestOption::Bytes(bytes)) => Ok(bytes),
        Some(DigestOption::Integer(_)) => Err(DisclosureError::invalid_argument(format!(
            "{} option {} must be a byte string",
            provider, name
        ))),
        None => Err(DisclosureError::invalid_argument(format!(
            "{} digest requires the {} option",
            provider, name
        ))),
    }
}

impl HashDigest {
    /// Resolve a provider name, algorithm name and options into a digest
    pub fn create(
        provider_name: &str,
        algorithm_name: &str,
        options: &BTreeMap<String, DigestOption>,
    ) -> Result<Self> {
        let algorithm = DigestAlgorithm::from_name(algorithm_name).ok_or_else(|| {
            DisclosureError::invalid_argument(format!(
                "unsupported digest algorithm {}",
                algorithm_name
            ))
        })?;

        let digest = match provider_name {
            DEFAULT_PROVIDER => HashDigest::Default(DefaultDigest::new(algorithm)),
            NONCE_PROVIDER => {
                let entropy = bytes_option(options, provider_name, ENTROPY_OPTION)?;
                HashDigest::Nonce(NonceDigest::new(algorithm, entropy)?)
            },
            NONCE_VERIFY_PROVIDER => HashDigest::NonceVerify(NonceVerifyDigest::new(algorithm)),
            NONCE_SIZE_ONLY_VERIFY_PROVIDER => {
                HashDigest::NonceSizeOnlyVerify(NonceSizeOnlyVerifyDigest::new(algorithm))
            },
            TWEAKABLE_PROVIDER => {
                let leaf_prefix = bytes_option(options, provider_name, LEAF_PREFIX_OPTION)?;
                let node_prefix = bytes_option(options, provider_name, NODE_PREFIX_OPTION)?;
                HashDigest::Tweakable(TweakableDigest::new(
                    algorithm,
                    leaf_prefix,
                    node_prefix,
                )?)
            },
            other => {
                return Err(DisclosureError::invalid_argument(format!(
                    "unknown digest provider {}",
                    other
                )))
            },
        };

        for name in options.keys() {
            if !digest.recognises_option(name) {
                tracing::debug!(provider = provider_name, option = %name, "ignoring digest option");
            }
        }

        Ok(digest)
    }

    pub fn default_digest(algorithm: DigestAlgorithm) -> Self {
        HashDigest::Default(DefaultDigest::new(algorithm))
    }

    pub fn nonce(algorithm: DigestAlgorithm, entropy: [u8; ENTROPY_LEN]) -> Self {
        HashDigest::Nonce(NonceDigest::with_entropy(algorithm, entropy))
    }

    pub fn nonce_verify(algorithm: DigestAlgorithm) -> Self {
        HashDigest::NonceVerify(NonceVerifyDigest::new(algorithm))
    }

    pub fn nonce_size_only_verify(algorithm: DigestAlgorithm) -> Self {
        HashDigest::NonceSizeOnlyVerify(NonceSizeOnlyVerifyDigest::new(algorithm))
    }

    pub fn tweakable(
        algorithm: DigestAlgorithm,
        leaf_prefix: impl Into<Vec<u8>>,
        node_prefix: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        Ok(HashDigest::Tweakable(TweakableDigest::new(
            algorithm,
            leaf_prefix,
            node_prefix,
        )?))
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            HashDigest::Default(_) => DEFAULT_PROVIDER,
            HashDigest::Nonce(_) => NONCE_PROVIDER,
            HashDigest::NonceVerify(_) => NONCE_VERIFY_PROVIDER,
            HashDigest::NonceSizeOnlyVerify(_) => NONCE_SIZE_ONLY_VERIFY_PROVIDER,
            HashDigest::Tweakable(_) => TWEAKABLE_PROVIDER,
        }
    }

    /// Options in their serialized form
    pub fn options(&self) -> BTreeMap<String, DigestOption> {
        let mut options = BTreeMap::new();
        match self {
            HashDigest::Nonce(digest) => {
                options.insert(ENTROPY_OPTION.to_string(), digest.entropy().as_slice().into());
            },
            HashDigest::Tweakable(digest) => {
                options.insert(LEAF_PREFIX_OPTION.to_string(), digest.leaf_prefix().into());
                options.insert(NODE_PREFIX_OPTION.to_string(), digest.node_prefix().into());
            },
            _ => {},
        }
        options
    }

    /// Digest a counterparty without the entropy uses to check audit proofs
    /// produced under this digest
    pub fn verifier(&self) -> HashDigest {
        match self {
            HashDigest::Nonce(digest) => HashDigest::nonce_verify(digest.algorithm()),
            other => other.clone(),
        }
    }

    fn recognises_option(&self, name: &str) -> bool {
        match self {
            HashDigest::Nonce(_) => name == ENTROPY_OPTION,
            HashDigest::Tweakable(_) => name == LEAF_PREFIX_OPTION || name == NODE_PREFIX_OPTION,
            _ => false,
        }
    }

    fn provider(&self) -> &dyn HashDigestProvider {
        match self {
            HashDigest::Default(digest) => digest,
            HashDigest::Nonce(digest) => digest,
            HashDigest::NonceVerify(digest) => digest,
            HashDigest::NonceSizeOnlyVerify(digest) => digest,
            HashDigest::Tweakable(digest) => digest,
        }
    }
}

impl HashDigestProvider for HashDigest {
    fn algorithm(&self) -> DigestAlgorithm {
        self.provider().algorithm()
    }

    fn leaf_nonce(&self, index: u32) -> Option<Vec<u8>> {
        self.provider().leaf_nonce(index)
    }

    fn leaf_hash(&self, index: u32, nonce: Option<&[u8]>, data: &[u8]) -> Result<Hash> {
        self.provider().leaf_hash(index, nonce, data)
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        self.provider().node_hash(left, right)
    }
}

impl TryFrom<HashDigestSpec> for HashDigest {
    type Error = DisclosureError;

    fn try_from(spec: HashDigestSpec) -> Result<Self> {
        HashDigest::create(&spec.provider, &spec.algorithm, &spec.options)
    }
}

impl From<HashDigest> for HashDigestSpec {
    fn from(digest: HashDigest) -> Self {
        HashDigestSpec {
            provider: digest.provider_name().to_string(),
            algorithm: digest.algorithm().name().to_string(),
            options: digest.options(),
        }
    }
}

/// Create a digest from its provider name, algorithm name and options
pub fn create_hash_digest(
    provider_name: &str,
    algorithm_name: &str,
    options: &BTreeMap<String, DigestOption>,
) -> Result<HashDigest> {
    HashDigest::create(provider_name, algorithm_name, options)
}
