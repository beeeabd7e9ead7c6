use crate::cli::commands::read_document;
use crate::core::types::Hash;
use crate::filtered::{ComponentGroup, DisclosureMode, FilteredRecord};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

pub fn execute(record: PathBuf, id: Option<String>, json: bool) -> Result<()> {
    let text = read_document(Some(record.as_path()))?;
    let filtered: FilteredRecord =
        serde_json::from_str(&text).context("Failed to parse filtered record")?;

    if let Some(expected) = &id {
        let expected: Hash = expected
            .parse()
            .with_context(|| format!("Invalid record id: {}", expected))?;
        if &expected != filtered.id() {
            if json {
                println!("{}", json!({ "verified": false, "error": "id mismatch" }));
            } else {
                println!("{}", "✗ Record id does not match".red());
            }
            bail!("Record id mismatch");
        }
    }

    if let Err(err) = filtered.verify() {
        if json {
            println!(
                "{}",
                json!({ "verified": false, "id": filtered.id(), "error": err.to_string() })
            );
        } else {
            println!("{} {}", "✗".red(), err.to_string().red());
        }
        return Err(err.into());
    }

    if json {
        let groups: Vec<_> = ComponentGroup::ALL
            .iter()
            .map(|group| match filtered.group(*group) {
                Some(fragment) => json!({
                    "group": group,
                    "mode": fragment.mode,
                    "size": fragment.size(),
                    "disclosed": fragment.proof.as_ref().map(|p| p.disclosed_indices()),
                }),
                None => json!({ "group": group, "mode": "Removed" }),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "verified": true,
                "id": filtered.id(),
                "groups": groups,
            }))?
        );
        return Ok(());
    }

    println!("{}", "✓ Filtered record verified".green());
    println!("{}: {}", "Record Id".bold(), filtered.id().to_string().cyan());
    println!(
        "{}: {} v{}",
        "Ledger".bold(),
        filtered.metadata().ledger_model,
        filtered.metadata().ledger_version
    );
    println!();
    for group in ComponentGroup::ALL {
        let summary = match filtered.group(group) {
            None => "removed".dimmed().to_string(),
            Some(fragment) => match fragment.mode {
                DisclosureMode::SizeOnly => format!("size {}", fragment.size()),
                DisclosureMode::Audit => format!(
                    "{} of {} disclosed",
                    fragment.proof.as_ref().map_or(0, |p| p.leaves().len()),
                    fragment.size()
                ),
            },
        };
        println!("  {:<12} {}", group.name().bold(), summary);
    }
    Ok(())
}
