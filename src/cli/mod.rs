//! Command-line interface for merkle-disclosure

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// merkle-disclosure - Merkle proofs and selectively disclosed records
#[derive(Parser)]
#[command(
    name = "merkle-disclosure",
    version,
    about = "Build merkle trees, prove and verify leaf disclosures, and filter ledger records",
    long_about = "merkle-disclosure builds hash trees over ordered data blocks, produces proofs that reveal chosen leaves or only the leaf count, and filters ledger records so that a counterparty can check what was disclosed against the record identifier."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output: auto, always, never
    #[arg(long, default_value = "auto", global = true)]
    pub color: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Digest selection shared by the tree commands; unset flags fall back to the global config
#[derive(Args, Debug, Clone, Default)]
pub struct DigestArgs {
    /// Digest provider: Default, Nonce, NonceVerify, NonceSizeOnlyVerify, Tweakable
    #[arg(long)]
    pub provider: Option<String>,

    /// Base hash algorithm, e.g. SHA-256
    #[arg(long)]
    pub algorithm: Option<String>,

    /// Nonce entropy as 64 hex characters
    #[arg(long, env = "MERKLE_DISCLOSURE_ENTROPY", hide_env_values = true)]
    pub entropy: Option<String>,

    /// Tweakable leaf prefix as hex
    #[arg(long)]
    pub leaf_prefix: Option<String>,

    /// Tweakable node prefix as hex
    #[arg(long)]
    pub node_prefix: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the root of a tree whose leaves are the given files
    Root {
        /// Files to use as leaves, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        digest: DigestArgs,

        /// Also print every leaf hash
        #[arg(long)]
        leaves: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a proof over the given files
    Prove {
        /// Files to use as leaves, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Leaf index to disclose (repeatable)
        #[arg(short, long = "index", value_name = "INDEX")]
        indices: Vec<u32>,

        /// Prove only the number of leaves
        #[arg(long, conflicts_with = "indices")]
        size_only: bool,

        #[command(flatten)]
        digest: DigestArgs,

        /// Output file for proof (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a proof document
    Verify {
        /// Proof file to verify
        #[arg(value_name = "PROOF", required_unless_present = "from_stdin")]
        proof: Option<PathBuf>,

        /// Expected root hash (default: the root recorded in the document)
        #[arg(long)]
        root: Option<String>,

        /// Read proof from stdin
        #[arg(long)]
        from_stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter a ledger record down to the chosen disclosures
    Filter {
        /// Record document (JSON)
        record: PathBuf,

        /// Reveal the notary name
        #[arg(long)]
        notary: bool,

        /// Reveal the time window
        #[arg(long)]
        time_window: bool,

        /// Disclose every element of a group (repeatable)
        #[arg(long = "audit", value_name = "GROUP")]
        audit: Vec<String>,

        /// Disclose chosen elements of a group, e.g. outputs=0,3 (repeatable)
        #[arg(long = "audit-indices", value_name = "GROUP=INDICES")]
        audit_indices: Vec<String>,

        /// Disclose only the element count of a group (repeatable)
        #[arg(long = "size-only", value_name = "GROUP")]
        size_only: Vec<String>,

        /// Output file for the filtered record (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a filtered record against its identifier
    VerifyRecord {
        /// Filtered record file (JSON)
        record: PathBuf,

        /// Expected record identifier
        #[arg(long)]
        id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage global configuration
    Config {
        /// Configuration key to get/set
        key: Option<String>,
        /// Configuration value to set
        value: Option<String>,
        /// List all configuration values
        #[arg(short, long)]
        list: bool,
        /// Unset a configuration value
        #[arg(long)]
        unset: bool,
        /// Show global configuration file location
        #[arg(long)]
        show_origin: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
