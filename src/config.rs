use ambience_audio::{AcousticLibrary, AmbienceSettings};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_SETTINGS_PATH: &str = "config/ambience.toml";
pub const DEFAULT_LIBRARY_PATH: &str = "config/acoustics.json";

/// Library shipped with the binary, used when the on-disk one is missing or broken.
const BUILTIN_LIBRARY: &str = include_str!("../config/acoustics.json");

/// Load settings from an explicit path, falling back to defaults on errors.
///
/// The result is always sanitized.
pub fn load_settings_from_path(path: &Path) -> AmbienceSettings {
    let settings = match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<AmbienceSettings>(&contents) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                AmbienceSettings::default()
            }
        },
        Err(err) => {
            if path != Path::new(DEFAULT_SETTINGS_PATH)
                || err.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
            } else {
                warn!(
                    "Ambience config not found at {}. Using defaults",
                    path.display()
                );
            }
            AmbienceSettings::default()
        }
    };
    settings.sanitized()
}

/// Save settings as TOML, creating parent directories.
pub fn save_settings_to_path(settings: &AmbienceSettings, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, toml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load the acoustic library, falling back to the built-in one on errors.
pub fn load_library_from_path(path: &Path) -> AcousticLibrary {
    match AcousticLibrary::from_path(path) {
        Ok(library) => library,
        Err(err) => {
            warn!("{err}. Using built-in acoustic library");
            builtin_library()
        }
    }
}

/// The acoustic library compiled into the binary.
pub fn builtin_library() -> AcousticLibrary {
    match AcousticLibrary::from_json_str(BUILTIN_LIBRARY) {
        Ok(library) => library,
        Err(err) => {
            warn!("Built-in acoustic library is invalid: {err}. Continuing without sounds");
            AcousticLibrary::new()
        }
    }
}
