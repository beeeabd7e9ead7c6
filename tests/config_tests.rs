//! Global configuration tests
//!
//! Tests that touch the configuration file point `MERKLE_DISCLOSURE_CONFIG`
//! at a temporary directory and run serially.

use merkle_disclosure::config::{ConfigKey, ConfigValue, GlobalConfig, CONFIG_PATH_ENV};
use merkle_disclosure::{DigestAlgorithm, HashDigest};
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

fn with_config_file<F>(test: F) -> anyhow::Result<()>
where
    F: FnOnce(&std::path::Path) -> anyhow::Result<()>,
{
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("nested").join("config.toml");
    std::env::set_var(CONFIG_PATH_ENV, &path);
    let result = test(&path);
    std::env::remove_var(CONFIG_PATH_ENV);
    result
}

#[test]
fn test_config_serialization() -> anyhow::Result<()> {
    let mut config = GlobalConfig::default();
    config.set(
        ConfigKey::DigestProvider,
        ConfigValue::String("Tweakable".to_string()),
    )?;
    config.set(
        ConfigKey::DigestLeafPrefix,
        ConfigValue::String("4C45".to_string()),
    )?;
    config.set(
        ConfigKey::DigestNodePrefix,
        ConfigValue::String("4e".to_string()),
    )?;

    let toml_content = toml::to_string_pretty(&config)?;
    assert!(toml_content.contains("Tweakable"));
    // Hex is stored lower-cased
    assert!(toml_content.contains("4c45"));

    let loaded = GlobalConfig::from_toml(&toml_content)?;
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.hash_digest()?,
        HashDigest::tweakable(DigestAlgorithm::Sha256, b"LE".to_vec(), b"N".to_vec())?
    );
    Ok(())
}

#[test]
fn test_partial_file_keeps_defaults() -> anyhow::Result<()> {
    let config = GlobalConfig::from_toml("[digest]\nalgorithm = \"SHA-512\"\n")?;
    assert_eq!(config.digest.provider, None);
    assert!(config.pretty_output());
    assert_eq!(
        config.hash_digest()?,
        HashDigest::default_digest(DigestAlgorithm::Sha512)
    );
    Ok(())
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = GlobalConfig::default();
    let rejected = [
        (ConfigKey::DigestProvider, ConfigValue::String("Blake3".to_string())),
        (ConfigKey::DigestAlgorithm, ConfigValue::String("MD5".to_string())),
        (ConfigKey::DigestEntropy, ConfigValue::String("abcd".to_string())),
        (ConfigKey::DigestLeafPrefix, ConfigValue::String("zz".to_string())),
        (ConfigKey::DigestNodePrefix, ConfigValue::String(String::new())),
        (ConfigKey::OutputPretty, ConfigValue::String("maybe".to_string())),
    ];
    for (key, value) in rejected {
        assert!(config.set(key.clone(), value).is_err(), "{} accepted", key.as_str());
    }
    assert_eq!(config, GlobalConfig::default());
}

#[test]
fn test_nonce_without_entropy_is_a_configuration_error() -> anyhow::Result<()> {
    let mut config = GlobalConfig::default();
    config.set(
        ConfigKey::DigestProvider,
        ConfigValue::String("Nonce".to_string()),
    )?;
    let err = config.hash_digest().unwrap_err();
    assert!(matches!(
        err,
        merkle_disclosure::DisclosureError::ConfigurationError { .. }
    ));
    Ok(())
}

#[test]
#[serial]
fn test_config_path_follows_environment() -> anyhow::Result<()> {
    with_config_file(|path| {
        assert_eq!(GlobalConfig::get_config_path()?, path.to_path_buf());
        Ok(())
    })
}

#[test]
#[serial]
fn test_missing_file_loads_defaults() -> anyhow::Result<()> {
    with_config_file(|path| {
        assert!(!path.exists());
        assert_eq!(GlobalConfig::load()?, GlobalConfig::default());
        Ok(())
    })
}

#[test]
#[serial]
fn test_save_and_load() -> anyhow::Result<()> {
    with_config_file(|path| {
        let mut config = GlobalConfig::default();
        config.set(
            ConfigKey::DigestProvider,
            ConfigValue::String("Nonce".to_string()),
        )?;
        config.set(
            ConfigKey::DigestEntropy,
            ConfigValue::String("00".repeat(32)),
        )?;
        config.set(ConfigKey::OutputPretty, ConfigValue::Boolean(false))?;
        config.set(
            ConfigKey::parse("team.name").unwrap(),
            ConfigValue::parse("auditors"),
        )?;
        config.save()?;
        assert!(path.exists());

        let loaded = GlobalConfig::load()?;
        assert_eq!(loaded, config);
        assert!(!loaded.pretty_output());
        assert_eq!(
            loaded.hash_digest()?,
            HashDigest::nonce(DigestAlgorithm::Sha256, [0u8; 32])
        );
        assert_eq!(
            loaded.get(&ConfigKey::Custom("team.name".to_string())),
            Some(ConfigValue::String("auditors".to_string()))
        );
        Ok(())
    })
}

#[test]
#[serial]
fn test_unset_and_list() -> anyhow::Result<()> {
    with_config_file(|_| {
        let mut config = GlobalConfig::default();
        config.set(ConfigKey::OutputPretty, ConfigValue::Boolean(false))?;
        config.unset(&ConfigKey::DigestProvider);
        config.save()?;

        let loaded = GlobalConfig::load()?;
        let keys: Vec<String> = loaded.list().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["digest.algorithm", "output.pretty"]);
        Ok(())
    })
}
