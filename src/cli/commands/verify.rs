use crate::cli::commands::{read_document, ProofDocument};
use crate::core::types::Hash;
use crate::crypto::HashDigestProvider;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

pub fn execute(
    proof: Option<PathBuf>,
    root: Option<String>,
    from_stdin: bool,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let path = if from_stdin { None } else { proof };
    let text = read_document(path.as_deref())?;
    let document: ProofDocument =
        serde_json::from_str(&text).context("Failed to parse proof document")?;

    let expected_root: Hash = match &root {
        Some(root) => root
            .parse()
            .with_context(|| format!("Invalid root hash: {}", root))?,
        None => document.root.clone(),
    };

    if verbose && !json {
        println!("{}", "Verifying proof...".green());
        println!("  • Proof type: {:?}", document.proof.proof_type());
        println!("  • Tree size: {}", document.proof.tree_size());
        println!("  • Disclosed leaves: {}", document.proof.leaves().len());
        println!("  • Sibling hashes: {}", document.proof.hashes().len());
        println!(
            "  • Digest: {} ({})",
            document.digest.provider_name(),
            document.digest.algorithm()
        );
        println!("  • Expected root: {}", expected_root.to_string().cyan());
    }

    let verified = document.proof.verify(&expected_root, &document.digest)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "verified": verified,
                "root": expected_root,
                "proof_type": document.proof.proof_type(),
                "tree_size": document.proof.tree_size(),
                "disclosed": document.proof.disclosed_indices(),
            }))?
        );
    } else if verified {
        println!("{}", "✓ Proof verification successful!".green());
    } else {
        println!("{}", "✗ Proof does not match the root".red());
    }

    if !verified {
        anyhow::bail!("Proof verification failed");
    }
    Ok(())
}
