//! Configuration command implementation

use crate::config::{ConfigKey, ConfigValue, GlobalConfig};
use anyhow::Result;
use colored::Colorize;

/// Execute the config command
pub fn execute(
    key: Option<String>,
    value: Option<String>,
    list: bool,
    unset: bool,
    show_origin: bool,
    json: bool,
) -> Result<()> {
    if show_origin {
        let config_path = GlobalConfig::get_config_path()?;
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": config_path.display().to_string(),
                    "exists": config_path.exists()
                })
            );
        } else {
            println!(
                "{}: {}",
                "Configuration file".bold(),
                config_path.display().to_string().cyan()
            );
            if config_path.exists() {
                println!("{}: {}", "Status".bold(), "exists".green());
            } else {
                println!("{}: {}", "Status".bold(), "not created yet".yellow());
            }
        }
        return Ok(());
    }

    let mut config = GlobalConfig::load()?;

    if list {
        return list_configuration(&config, json);
    }

    let Some(key_str) = key else {
        show_usage(json);
        return Ok(());
    };
    let config_key = ConfigKey::parse(&key_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {}", key_str))?;

    if unset {
        config.unset(&config_key);
        config.save()?;

        if json {
            println!(
                "{}",
                serde_json::json!({ "action": "unset", "key": key_str, "status": "success" })
            );
        } else {
            println!("{} {}", "✓".green(), format!("Unset {}", key_str).bold());
        }
    } else if let Some(value_str) = value {
        // Digest settings are text even when they look numeric, e.g. all-zero hex
        let parsed = match config_key {
            ConfigKey::OutputPretty | ConfigKey::Custom(_) => ConfigValue::parse(&value_str),
            _ => ConfigValue::String(value_str.clone()),
        };
        config.set(config_key, parsed)?;
        config.save()?;

        if json {
            println!(
                "{}",
                serde_json::json!({
                    "action": "set",
                    "key": key_str,
                    "value": value_str,
                    "status": "success"
                })
            );
        } else {
            println!("{} {} = {}", "✓".green(), key_str.bold(), value_str.cyan());
        }
    } else if let Some(value) = config.get(&config_key) {
        if json {
            println!(
                "{}",
                serde_json::json!({ "key": key_str, "value": value.to_string() })
            );
        } else {
            println!("{}", value);
        }
    } else if json {
        println!(
            "{}",
            serde_json::json!({ "key": key_str, "value": null, "error": "not set" })
        );
    } else {
        eprintln!(
            "{}",
            format!("Configuration key '{}' is not set", key_str).yellow()
        );
        anyhow::bail!("Configuration key not found");
    }

    Ok(())
}

fn show_usage(json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "error": "No configuration key specified",
                "usage": "merkle-disclosure config <key> [value] or --list"
            })
        );
        return;
    }

    println!("{}", "Configuration Management".green().bold());
    println!("{}", "═".repeat(40));
    println!();
    println!("{}", "Usage:".bold());
    println!("  {} Get value", "merkle-disclosure config <key>".cyan());
    println!("  {} Set value", "merkle-disclosure config <key> <value>".cyan());
    println!("  {} List all", "merkle-disclosure config --list".cyan());
    println!("  {} Unset value", "merkle-disclosure config --unset <key>".cyan());
    println!();
    println!("{}", "Common keys:".bold());
    println!("  {} Digest provider", "digest.provider".green());
    println!("  {} Base hash algorithm", "digest.algorithm".green());
    println!("  {} Nonce entropy (hex)", "digest.entropy".green());
    println!("  {} Pretty-print JSON output", "output.pretty".green());
}

fn list_configuration(config: &GlobalConfig, json: bool) -> Result<()> {
    let entries = config.list();

    if json {
        let config_map: std::collections::BTreeMap<String, String> =
            entries.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&config_map)?);
    } else if entries.is_empty() {
        println!("{}", "No configuration values set".yellow());
    } else {
        println!("{}", "Global Configuration".green().bold());
        println!("{}", "═".repeat(40));
        println!();

        for (key, value) in entries {
            // Entropy is secret material
            let shown = if key == ConfigKey::DigestEntropy.as_str() {
                "<redacted>".to_string()
            } else {
                value
            };
            println!("{} = {}", key.bold(), shown.cyan());
        }
    }

    Ok(())
}
