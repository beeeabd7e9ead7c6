use crate::cli::commands::{read_leaves, resolve_digest, to_json, write_output, ProofDocument};
use crate::cli::DigestArgs;
use crate::crypto::{HashDigest, HashDigestProvider};
use crate::proofs::MerkleTree;
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn execute(
    files: Vec<PathBuf>,
    indices: Vec<u32>,
    size_only: bool,
    digest: DigestArgs,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    if !size_only && indices.is_empty() {
        bail!("Specify at least one --index, or --size-only");
    }

    let digest = resolve_digest(&digest)?;
    let tree = MerkleTree::new(read_leaves(&files)?, digest)?;

    let (proof, verifier) = if size_only {
        // Unblinded leaf hashes would let anyone test guesses of the leaf data
        if !matches!(tree.digest(), HashDigest::Nonce(_)) {
            bail!(
                "Size-only proofs need the Nonce provider, got {}",
                tree.digest().provider_name()
            );
        }
        let verifier = HashDigest::nonce_size_only_verify(tree.digest().algorithm());
        (tree.create_size_only_proof(), verifier)
    } else {
        (tree.create_audit_proof(indices.iter().copied())?, tree.digest().verifier())
    };

    let document = ProofDocument {
        root: tree.root().clone(),
        digest: verifier,
        proof,
    };

    write_output(to_json(&document)?.as_bytes(), output.as_deref())?;

    if !quiet {
        if let Some(path) = &output {
            eprintln!(
                "{} {} proof over {} leaves written to {}",
                "✓".green(),
                if size_only { "Size-only" } else { "Audit" },
                tree.size(),
                path.display().to_string().cyan()
            );
        }
    }

    Ok(())
}
