use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Tool locations and defaults, read from `config.toml` in the platform
/// config directory. Missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_usearch")]
    pub usearch: String,
    /// uc → OTU table script; defaults to `uc2otutable.py` in the reference directory.
    #[serde(default)]
    pub uc2otutable: Option<PathBuf>,
    /// Directory holding chimera databases and the default mock community.
    #[serde(default)]
    pub reference_dir: Option<PathBuf>,
    #[serde(default = "default_map_identity")]
    pub map_identity: f64,
}

fn default_usearch() -> String {
    "usearch8".to_string()
}

fn default_map_identity() -> f64 {
    0.97
}

impl Default for Config {
    fn default() -> Self {
        Self {
            usearch: default_usearch(),
            uc2otutable: None,
            reference_dir: None,
            map_identity: default_map_identity(),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("org", "ufits", "otu-cluster-tools")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::path() {
            if config_path.exists() {
                if let Ok(content) = fs::read_to_string(config_path) {
                    if let Ok(config) = Self::from_toml(&content) {
                        return config;
                    }
                }
            }
        }
        Config::default()
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        let Some(config_path) = Self::path() else {
            return Ok(None);
        };
        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(Some(config_path))
    }

    /// Configured reference directory, else `lib/` next to the executable.
    pub fn reference_dir(&self) -> PathBuf {
        if let Some(dir) = &self.reference_dir {
            return dir.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("lib")))
            .unwrap_or_else(|| PathBuf::from("lib"))
    }

    pub fn uc2otutable(&self) -> PathBuf {
        self.uc2otutable
            .clone()
            .unwrap_or_else(|| self.reference_dir().join("uc2otutable.py"))
    }
}
