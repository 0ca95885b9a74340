use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

use podcycle_domain::PodcycleConfig;

pub const CONFIG_PATH_ENV: &str = "PODCYCLE_CONFIG_PATH";

/// Config file to load, from the flag, the environment or `$HOME/.podcycle`.
pub fn config_path(flag: Option<&Path>) -> Option<PathBuf> {
    resolve_config_path(
        flag,
        env::var(CONFIG_PATH_ENV).ok(),
        env::var("HOME").ok(),
    )
}

/// An explicit path is returned even if missing so loading reports it.
/// The home fallback is only used when the file exists.
pub fn resolve_config_path(
    flag: Option<&Path>,
    env_path: Option<String>,
    home: Option<String>,
) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|path| !path.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    home.map(|home| Path::new(&home).join(".podcycle").join("config.yaml"))
        .filter(|path| path.is_file())
}

pub fn load_config(path: Option<&Path>) -> Result<PodcycleConfig> {
    match path {
        Some(path) => PodcycleConfig::load_from_path(path),
        None => Ok(PodcycleConfig::default()),
    }
}
