//! Model configuration, persisted under the platform config dir.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Model answering text and vision queries.
    pub text_model: String,
    /// Model handling image-generation commands.
    pub image_model: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            text_model: "gemini-2.5-pro".into(),
            image_model: "gemini-2.5-flash-image".into(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("com.local", "ChatBot", "ChatBot")?;
    let _ = fs::create_dir_all(proj.config_dir());
    Some(proj.config_dir().join("settings.json"))
}

/// Load settings from disk, falling back to defaults when the file is
/// missing or unparsable.
pub fn load_settings_or_default() -> AppSettings {
    if let Some(path) = config_path() {
        if path.exists() {
            if let Ok(bytes) = fs::read(&path) {
                match serde_json::from_slice::<AppSettings>(&bytes) {
                    Ok(settings) => return settings,
                    Err(e) => warn!("ignoring unparsable settings file: {}", e),
                }
            }
        }
    }
    AppSettings::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        let settings = AppSettings::default();
        assert_eq!(settings.text_model, "gemini-2.5-pro");
        assert_eq!(settings.image_model, "gemini-2.5-flash-image");
    }

    #[test]
    fn test_settings_round_trip_json() {
        let settings = AppSettings {
            text_model: "gemini-exp".into(),
            image_model: "gemini-image-exp".into(),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text_model, "gemini-exp");
        assert_eq!(back.image_model, "gemini-image-exp");
    }
}
