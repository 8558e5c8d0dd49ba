// src/infrastructure/plugins/firefox/config.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::plugin::PluginConfig;
use crate::infrastructure::plugins::{config_from_value, config_to_value, expand_path};
use ini::Ini;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Firefox data directories relative to the home directory, probed in order
const PROFILE_BASES: [&str; 3] = [
    ".mozilla/firefox",
    "snap/firefox/common/.mozilla/firefox",
    ".var/app/org.mozilla.firefox/.mozilla/firefox",
];

const PLACES_FILE: &str = "places.sqlite";
const FAVICONS_FILE: &str = "favicons.sqlite";

/// Settings table `[plugins.firefox]`; `profile_path` is the profile directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefoxConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

impl FirefoxConfig {
    pub fn with_profile<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            profile_path: Some(path.into()),
        }
    }

    pub fn from_value(raw: Option<&toml::Value>) -> DomainResult<Self> {
        config_from_value(raw, super::CONFIG_KEY)
    }

    pub fn places_file(&self) -> Option<PathBuf> {
        self.profile_path.as_ref().map(|p| p.join(PLACES_FILE))
    }

    pub fn favicons_file(&self) -> Option<PathBuf> {
        self.profile_path.as_ref().map(|p| p.join(FAVICONS_FILE))
    }
}

impl PluginConfig for FirefoxConfig {
    #[instrument(level = "debug")]
    fn load(&mut self) -> DomainResult<()> {
        if let Some(configured) = &self.profile_path {
            let expanded = expand_path(configured);
            if expanded.is_dir() {
                self.profile_path = Some(expanded);
                return Ok(());
            }
            debug!(
                "Configured Firefox profile not accessible, auto-detecting: {}",
                expanded.display()
            );
        }

        let home = dirs::home_dir()
            .ok_or_else(|| DomainError::Configuration("home directory unknown".to_string()))?;
        let profile = detect_profile(&home).unwrap_or_else(|| {
            debug!("No Firefox default profile found, using fallback location");
            home.join(PROFILE_BASES[0]).join("default")
        });
        debug!("Using Firefox profile: {}", profile.display());
        self.profile_path = Some(profile);
        Ok(())
    }

    fn save(&self) -> DomainResult<toml::Value> {
        config_to_value(self)
    }

    fn profile_path(&self) -> Option<PathBuf> {
        self.profile_path.clone()
    }
}

/// Default profile of the first Firefox data directory below `home` that names one.
///
/// `installs.ini` (one section per installation) takes precedence over the legacy
/// `profiles.ini` `Default=1` marker.
pub fn detect_profile(home: &Path) -> Option<PathBuf> {
    PROFILE_BASES
        .iter()
        .map(|base| home.join(base))
        .filter(|base| base.is_dir())
        .find_map(|base| {
            default_from_installs(&base)
                .or_else(|| default_from_profiles(&base))
                .filter(|profile| profile.is_dir())
        })
}

fn default_from_installs(base: &Path) -> Option<PathBuf> {
    let installs = load_ini(&base.join("installs.ini"))?;
    installs
        .iter()
        .find_map(|(_, section)| section.get("Default").map(|name| resolve(base, name, true)))
}

fn default_from_profiles(base: &Path) -> Option<PathBuf> {
    let profiles = load_ini(&base.join("profiles.ini"))?;
    profiles
        .iter()
        .filter(|(name, _)| name.is_some_and(|n| n.starts_with("Profile")))
        .map(|(_, section)| section)
        .find(|section| section.get("Default") == Some("1"))
        .and_then(|section| {
            let relative = section.get("IsRelative") != Some("0");
            section.get("Path").map(|path| resolve(base, path, relative))
        })
}

/// A missing or unparsable file names no profile.
fn load_ini(path: &Path) -> Option<Ini> {
    if !path.is_file() {
        return None;
    }
    Ini::load_from_file(path)
        .map_err(|e| debug!("Ignoring {}: {}", path.display(), e))
        .ok()
}

fn resolve(base: &Path, path: &str, relative: bool) -> PathBuf {
    if relative {
        base.join(path)
    } else {
        PathBuf::from(path)
    }
}
