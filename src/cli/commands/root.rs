use crate::cli::commands::{read_leaves, resolve_digest};
use crate::cli::DigestArgs;
use crate::crypto::HashDigestProvider;
use crate::proofs::MerkleTree;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

/// Execute the root command
pub fn execute(
    files: Vec<PathBuf>,
    digest: DigestArgs,
    leaves: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let digest = resolve_digest(&digest)?;
    let tree = MerkleTree::new(read_leaves(&files)?, digest)?;

    if json {
        show_root_json(&tree, &files, leaves)
    } else {
        show_root_human(&tree, &files, leaves, quiet);
        Ok(())
    }
}

fn show_root_human(tree: &MerkleTree, files: &[PathBuf], leaves: bool, quiet: bool) {
    if quiet {
        println!("{}", tree.root());
        return;
    }

    println!("{}", "Merkle Root".green().bold());
    println!("{}", "═".repeat(50).green());
    println!("{}: {}", "Root Hash".bold(), tree.root().to_string().cyan());
    println!("{}: {}", "Leaves".bold(), tree.size());
    println!(
        "{}: {} ({})",
        "Digest".bold(),
        tree.digest().provider_name(),
        tree.digest().algorithm()
    );

    if leaves {
        println!();
        println!("{}", "Leaf Hashes:".bold());
        for (index, (path, hash)) in files.iter().zip(tree.leaf_hashes()).enumerate() {
            println!(
                "  {} {} {}",
                format!("[{}]", index).dimmed(),
                hash.to_hex().cyan(),
                path.display()
            );
        }
    }
}

fn show_root_json(tree: &MerkleTree, files: &[PathBuf], leaves: bool) -> Result<()> {
    let mut output = json!({
        "root": tree.root(),
        "tree_size": tree.size(),
        "provider": tree.digest().provider_name(),
        "algorithm": tree.digest().algorithm(),
    });

    if leaves {
        output["leaves"] = files
            .iter()
            .zip(tree.leaf_hashes())
            .enumerate()
            .map(|(index, (path, hash))| {
                json!({
                    "index": index,
                    "path": path.display().to_string(),
                    "hash": hash,
                })
            })
            .collect();
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
