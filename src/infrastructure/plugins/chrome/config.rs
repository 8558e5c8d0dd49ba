// src/infrastructure/plugins/chrome/config.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::plugin::PluginConfig;
use crate::infrastructure::plugins::{config_from_value, config_to_value, expand_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// `Bookmarks` locations relative to the home directory, probed in order
const PROFILE_CANDIDATES: [&str; 7] = [
    ".config/google-chrome/Default/Bookmarks",
    ".config/chromium/Default/Bookmarks",
    "snap/chromium/common/chromium/Default/Bookmarks",
    "snap/chromium/common/.config/chromium/Default/Bookmarks",
    ".var/app/org.chromium.Chromium/config/chromium/Default/Bookmarks",
    "snap/google-chrome/current/.config/google-chrome/Default/Bookmarks",
    ".var/app/com.google.Chrome/config/google-chrome/Default/Bookmarks",
];

const BOOKMARKS_FILE: &str = "Bookmarks";
const FAVICONS_FILE: &str = "Favicons";

/// Settings table `[plugins.chrome]`.
///
/// `profile_path` names the `Bookmarks` file or the profile directory holding it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

impl ChromeConfig {
    pub fn with_profile<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            profile_path: Some(path.into()),
        }
    }

    pub fn from_value(raw: Option<&toml::Value>) -> DomainResult<Self> {
        config_from_value(raw, super::CONFIG_KEY)
    }

    pub fn bookmarks_file(&self) -> Option<PathBuf> {
        self.profile_path.as_deref().map(|path| {
            if path.is_dir() {
                path.join(BOOKMARKS_FILE)
            } else {
                path.to_path_buf()
            }
        })
    }

    /// The `Favicons` database next to the `Bookmarks` file
    pub fn favicons_file(&self) -> Option<PathBuf> {
        self.bookmarks_file()
            .and_then(|file| file.parent().map(|dir| dir.join(FAVICONS_FILE)))
    }
}

impl PluginConfig for ChromeConfig {
    #[instrument(level = "debug")]
    fn load(&mut self) -> DomainResult<()> {
        if let Some(configured) = &self.profile_path {
            let expanded = expand_path(configured);
            if expanded.exists() {
                self.profile_path = Some(expanded);
                return Ok(());
            }
            debug!(
                "Configured Chrome profile not accessible, auto-detecting: {}",
                expanded.display()
            );
        }

        let home = dirs::home_dir()
            .ok_or_else(|| DomainError::Configuration("home directory unknown".to_string()))?;
        let detected = detect_profile(&home).ok_or_else(|| {
            DomainError::Configuration("no accessible Chrome profile found".to_string())
        })?;
        debug!("Detected Chrome profile: {}", detected.display());
        self.profile_path = Some(detected);
        Ok(())
    }

    fn save(&self) -> DomainResult<toml::Value> {
        config_to_value(self)
    }

    fn profile_path(&self) -> Option<PathBuf> {
        self.profile_path.clone()
    }
}

/// First existing `Bookmarks` file below `home`
pub fn detect_profile(home: &Path) -> Option<PathBuf> {
    PROFILE_CANDIDATES
        .iter()
        .map(|candidate| home.join(candidate))
        .find(|path| path.is_file())
}
