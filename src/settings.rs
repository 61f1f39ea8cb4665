use serde::Deserialize;
use std::{error::Error, fs};

const SETTINGS_FILENAME: &str = "settings.json";

/// Server configuration, read from `settings.json` next to the binary.
/// Every field has a default so the file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub port: u16,
    pub store_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            store_path: "taskdeck.redb".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `settings.json`, falling back to defaults when
    /// the file is absent. A present-but-malformed file is an error.
    pub fn load() -> Result<Settings, Box<dyn Error>> {
        match fs::read_to_string(SETTINGS_FILENAME) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_address, "0.0.0.0");
        assert_eq!(settings.store_path, "taskdeck.redb");
    }
}
