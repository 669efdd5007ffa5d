use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::resource::ResourceFamily;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  /// Family to browse when none is named on the command line.
  pub default_family: Option<String>,
  /// Per-family page size overrides, keyed by family tag.
  #[serde(default)]
  pub page_sizes: BTreeMap<String, u32>,
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Base URL of the ServiceLink API, e.g. `https://api.servicelink.example`.
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./slink.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/slink/config.yaml
  /// 4. ~/.config/slink/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/slink/config.yaml\n\
                 with at least a server url."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("slink.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("slink").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Resolve a built-in family, applying any configured page size override.
  pub fn family(&self, name: &str) -> Option<ResourceFamily> {
    let family = ResourceFamily::by_name(name)?;
    match self.page_sizes.get(name) {
      Some(size) => Some(family.with_default_size(*size)),
      None => Some(family),
    }
  }

  /// Get the sign-in password from the environment.
  pub fn get_password() -> Result<String> {
    std::env::var("SLINK_PASSWORD")
      .map_err(|_| eyre!("Password not found. Set the SLINK_PASSWORD environment variable."))
  }

  /// Get a previously issued bearer token from the environment, if any.
  pub fn get_token() -> Option<String> {
    std::env::var("SLINK_TOKEN").ok()
  }
}
