use crate::config::Config;
use anyhow::{anyhow, Result};

pub fn run(write: bool) -> Result<()> {
    let config = Config::load();

    match Config::path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory on this platform"),
    }
    print!("{}", toml::to_string_pretty(&config)?);
    println!("# reference directory: {}", config.reference_dir().display());
    println!("# uc2otutable: {}", config.uc2otutable().display());

    if write {
        match config.save().map_err(|e| anyhow!("Failed to save config: {}", e))? {
            Some(path) => println!("Configuration written to {}", path.display()),
            None => anyhow::bail!("No config directory available on this platform"),
        }
    }
    Ok(())
}
