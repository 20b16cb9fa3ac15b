//! Client configuration commands.

use std::path::Path;

use anyhow::Result;

use crate::config::ClientConfig;

/// Write a config file with defaults, refusing to overwrite.
pub fn init(config_path: &Path, store: Option<&str>) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!(
            "Config {} already exists. Edit it or pass --config to use another file.",
            config_path.display()
        );
    }
    let mut config = ClientConfig::default();
    if let Some(store) = store {
        config.store = store.to_string();
    }
    config.save(config_path)?;
    println!("Config written to {}.", config_path.display());
    println!("  Store: {}", config.store_path().display());
    Ok(())
}

/// Print the effective configuration.
pub fn show(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;
    println!("# {}", config_path.display());
    println!("# store resolves to {}", config.store_path().display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
