//! CLI command implementations

pub mod config;
pub mod filter;
pub mod prove;
pub mod root;
pub mod verify;
pub mod verify_record;

// Common utilities for commands
use crate::cli::DigestArgs;
use crate::config::{ConfigKey, ConfigValue, GlobalConfig};
use crate::core::types::Hash;
use crate::crypto::HashDigest;
use crate::filtered::ComponentGroup;
use crate::proofs::MerkleProof;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Proof as written by `prove` and read by `verify`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofDocument {
    /// Root of the tree the proof was taken from
    pub root: Hash,
    /// Digest a verifier replays the proof with
    pub digest: HashDigest,
    pub proof: MerkleProof,
}

/// Resolve the digest from command-line flags layered over the global config
pub fn resolve_digest(args: &DigestArgs) -> Result<HashDigest> {
    let mut config = GlobalConfig::load()?;
    let overrides = [
        (ConfigKey::DigestProvider, &args.provider),
        (ConfigKey::DigestAlgorithm, &args.algorithm),
        (ConfigKey::DigestEntropy, &args.entropy),
        (ConfigKey::DigestLeafPrefix, &args.leaf_prefix),
        (ConfigKey::DigestNodePrefix, &args.node_prefix),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            let flag = key.as_str().to_string();
            config
                .set(key, ConfigValue::String(value.clone()))
                .with_context(|| format!("Invalid --{} value", flag.replace("digest.", "").replace('_', "-")))?;
        }
    }
    Ok(config.hash_digest()?)
}

/// Read each file as one leaf, in argument order
pub fn read_leaves(files: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
    files
        .iter()
        .map(|path| {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

/// Read a text document from a file, or from stdin when `path` is `None` or "-"
pub fn read_document(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        },
    }
}

/// Serialize `value` as JSON, honouring the `output.pretty` setting
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let pretty = GlobalConfig::load().map(|c| c.pretty_output()).unwrap_or(true);
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Write bytes to `output`, or to stdout when no file is given
pub fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            if !bytes.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        },
    }
}

/// Parse a list group name such as "outputs"
pub fn parse_group(name: &str) -> Result<ComponentGroup> {
    match ComponentGroup::from_name(&name.to_lowercase()) {
        Some(ComponentGroup::Metadata) | Some(ComponentGroup::Notary) => Err(anyhow::anyhow!(
            "Group '{}' is not a list group; use --notary or --time-window for the notary",
            name
        )),
        Some(group) => Ok(group),
        None => Err(anyhow::anyhow!("Unknown component group: {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group() {
        assert_eq!(parse_group("outputs").unwrap(), ComponentGroup::Outputs);
        assert_eq!(parse_group("Signatories").unwrap(), ComponentGroup::Signatories);
        assert!(parse_group("notary").is_err());
        assert!(parse_group("attachments").is_err());
    }
}
