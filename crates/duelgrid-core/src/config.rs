use std::path::Path;

use serde::de::DeserializeOwned;

/// Load a TOML config, trying the path in `env_var` first and then
/// `default_path`. Missing files fall through silently; a file that exists
/// but fails to parse is logged and skipped. Returns `T::default()` when
/// nothing usable is found.
pub fn load_or_default<T: DeserializeOwned + Default>(env_var: &str, default_path: &str) -> T {
    if let Ok(path) = std::env::var(env_var)
        && !path.is_empty()
        && let Some(config) = read_toml(Path::new(&path))
    {
        return config;
    }
    read_toml(Path::new(default_path)).unwrap_or_default()
}

/// Parse one TOML file, or `None` if it is missing or invalid.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<T>(&contents) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Loaded configuration");
            Some(config)
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse config, ignoring");
            None
        },
    }
}
