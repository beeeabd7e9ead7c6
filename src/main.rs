//! merkle-disclosure CLI
//!
//! Command-line interface for building, proving and verifying merkle trees and
//! filtered ledger records.

use anyhow::Result;
use clap::Parser;
use merkle_disclosure::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that JSON documents on stdout stay parseable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {},
    }

    match cli.command {
        Commands::Root {
            files,
            digest,
            leaves,
            json,
        } => commands::root::execute(files, digest, leaves, json, cli.quiet),
        Commands::Prove {
            files,
            indices,
            size_only,
            digest,
            output,
        } => commands::prove::execute(files, indices, size_only, digest, output, cli.quiet),
        Commands::Verify {
            proof,
            root,
            from_stdin,
            json,
        } => commands::verify::execute(proof, root, from_stdin, json, cli.verbose),
        Commands::Filter {
            record,
            notary,
            time_window,
            audit,
            audit_indices,
            size_only,
            output,
        } => commands::filter::execute(
            record,
            notary,
            time_window,
            audit,
            audit_indices,
            size_only,
            output,
            cli.quiet,
        ),
        Commands::VerifyRecord { record, id, json } => {
            commands::verify_record::execute(record, id, json)
        },
        Commands::Config {
            key,
            value,
            list,
            unset,
            show_origin,
            json,
        } => commands::config::execute(key, value, list, unset, show_origin, json),
    }
}
