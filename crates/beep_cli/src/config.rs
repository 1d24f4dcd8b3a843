use beep_sim::SimConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// `~/.beep`, or `./.beep` without a home directory
///
/// Nothing is created here; [`save`] creates the directory on first write.
pub fn beep_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".beep"))
        .unwrap_or_else(|| {
            warn!("No home directory, keeping beep data in ./.beep");
            PathBuf::from(".beep")
        })
}

pub fn default_config_path() -> PathBuf {
    beep_data_dir().join("config.toml")
}

/// Load a simulation config from TOML
///
/// With no explicit path the default location is used, and a missing default
/// file is created with default settings. An explicit path must exist.
pub fn load(path: Option<&Path>) -> anyhow::Result<SimConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path();
            if !p.exists() {
                let config = SimConfig::default();
                save(&config, &p)?;
                return Ok(config);
            }
            p
        }
    };

    let content = fs::read_to_string(&path)?;
    parse(&content)
}

pub fn parse(content: &str) -> anyhow::Result<SimConfig> {
    let config: SimConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn save(config: &SimConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let toml = toml::to_string_pretty(config)?;
    fs::write(path, toml)?;
    Ok(())
}
