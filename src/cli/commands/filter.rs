use crate::cli::commands::{parse_group, read_document, to_json, write_output};
use crate::filtered::{
    ComponentGroup, FilteredRecordBuilder, LedgerRecord, PrivacySalt, RecordComponents,
    RecordMetadata,
};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Unfiltered record as read by `filter`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDocument {
    pub metadata: RecordMetadata,
    /// Generated when absent, which gives the record a fresh identifier
    #[serde(default)]
    pub privacy_salt: Option<PrivacySalt>,
    pub components: RecordComponents,
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    record: PathBuf,
    notary: bool,
    time_window: bool,
    audit: Vec<String>,
    audit_indices: Vec<String>,
    size_only: Vec<String>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let text = read_document(Some(record.as_path()))?;
    let document: RecordDocument =
        serde_json::from_str(&text).context("Failed to parse record document")?;

    let salt = document.privacy_salt.unwrap_or_else(|| {
        info!("record has no privacy salt, generating one");
        PrivacySalt::random()
    });
    let record = LedgerRecord::new(document.metadata, salt, &document.components)?;

    let mut builder = record.filter();
    if notary {
        builder = builder.with_notary();
    }
    if time_window {
        builder = builder.with_time_window();
    }
    for name in &size_only {
        builder = builder.size_only(parse_group(name)?);
    }
    for name in &audit {
        builder = builder.audit_all(parse_group(name)?);
    }
    for selection in &audit_indices {
        builder = apply_indices(builder, selection)?;
    }

    let filtered = builder.build()?;
    write_output(to_json(&filtered)?.as_bytes(), output.as_deref())?;

    if !quiet {
        if let Some(path) = &output {
            eprintln!(
                "{} Filtered record {} written to {}",
                "✓".green(),
                filtered.id().to_string().cyan(),
                path.display()
            );
        }
    }
    Ok(())
}

/// Apply a `group=i,j,...` selection
fn apply_indices<'a>(
    builder: FilteredRecordBuilder<'a>,
    selection: &str,
) -> Result<FilteredRecordBuilder<'a>> {
    let (name, list) = selection
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected GROUP=INDICES, got {}", selection))?;
    let group: ComponentGroup = parse_group(name)?;
    let indices = list
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid index '{}' for {}", part, name))
        })
        .collect::<Result<Vec<u32>>>()?;
    Ok(builder.audit_indices(group, indices))
}
