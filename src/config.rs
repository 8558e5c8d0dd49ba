use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Directory name of the favicon files below the user cache directory
const ICON_CACHE_DIR: &str = "marks-favicons";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_url: String,

    /// Directory of the cached favicon files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Settings table per plugin, keyed by plugin name (`chrome`, `firefox`)
    #[serde(default)]
    pub plugins: BTreeMap<String, toml::Value>,
}

fn default_db_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/marks/marks.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: default_db_path(),
            cache_dir: None,
            plugins: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Configured cache directory, else `<user cache dir>/marks-favicons`
    pub fn icon_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
                .unwrap_or_else(std::env::temp_dir)
                .join(ICON_CACHE_DIR)
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config/marks/config.toml"))
}

/// Load settings from `config_file` (or the default location) and the environment.
///
/// A missing default config file is not an error; an explicit one must exist and parse.
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    let mut settings = match config_file {
        Some(path) => read_config_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => read_config_file(&path)?,
            None => Settings::default(),
        },
    };

    if let Ok(db_url) = std::env::var("MARKS_DB_URL") {
        trace!("Using MARKS_DB_URL from environment: {}", db_url);
        settings.db_url = db_url;
    }

    if let Ok(cache_dir) = std::env::var("MARKS_CACHE_DIR") {
        trace!("Using MARKS_CACHE_DIR from environment: {}", cache_dir);
        settings.cache_dir = Some(PathBuf::from(cache_dir));
    }

    debug!("Settings loaded: {:?}", settings);
    Ok(settings)
}

fn read_config_file(path: &Path) -> DomainResult<Settings> {
    trace!("Loading config from: {:?}", path);
    let text = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str::<Settings>(&text)
        .map_err(|e| DomainError::Configuration(format!("invalid {}: {}", path.display(), e)))
}

pub fn generate_default_config() -> String {
    let mut default_settings = Settings::default();
    default_settings.plugins.insert(
        "chrome".to_string(),
        toml::Value::Table(toml::map::Map::new()),
    );
    default_settings.plugins.insert(
        "firefox".to_string(),
        toml::Value::Table(toml::map::Map::new()),
    );
    let body = toml::to_string_pretty(&default_settings)
        .unwrap_or_else(|_| "# Error generating default configuration".to_string());
    format!(
        "# marks configuration\n\
         # Set profile_path in a plugin table to skip auto-detection, e.g.\n\
         # [plugins.chrome]\n\
         # profile_path = \"~/.config/chromium/Default/Bookmarks\"\n\n{}",
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::EnvGuard;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    #[serial]
    fn given_config_file_when_load_settings_then_values_and_plugin_tables_read() {
        let _guard = EnvGuard::new();
        env::remove_var("MARKS_DB_URL");
        env::remove_var("MARKS_CACHE_DIR");
        let (_dir, path) = create_temp_config_file(
            r#"
            db_url = "/config/marks.db"
            cache_dir = "/config/icons"

            [plugins.chrome]
            profile_path = "/profiles/chrome/Bookmarks"

            [plugins.firefox]
            "#,
        );

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.db_url, "/config/marks.db");
        assert_eq!(settings.icon_cache_dir(), PathBuf::from("/config/icons"));
        assert_eq!(settings.plugins.len(), 2);
        assert_eq!(
            settings.plugins["chrome"].get("profile_path").and_then(|v| v.as_str()),
            Some("/profiles/chrome/Bookmarks")
        );
    }

    #[test]
    #[serial]
    fn given_environment_when_load_settings_then_overrides_config_file() {
        let _guard = EnvGuard::new();
        env::set_var("MARKS_DB_URL", "/env/override.db");
        env::set_var("MARKS_CACHE_DIR", "/env/icons");
        let (_dir, path) = create_temp_config_file("db_url = \"/config/non-override.db\"\n");

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.db_url, "/env/override.db");
        assert_eq!(settings.cache_dir, Some(PathBuf::from("/env/icons")));
    }

    #[test]
    #[serial]
    fn given_missing_explicit_file_when_load_settings_then_configuration_error() {
        let _guard = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();

        let result = load_settings(Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    #[serial]
    fn given_invalid_toml_when_load_settings_then_configuration_error() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("db_url = [unclosed");

        let result = load_settings(Some(&path));

        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn given_no_cache_dir_when_icon_cache_dir_then_named_below_user_cache() {
        let settings = Settings {
            cache_dir: None,
            ..Default::default()
        };

        assert!(settings.icon_cache_dir().ends_with("marks-favicons"));
        assert!(default_db_path().ends_with("marks.db"));
    }

    #[test]
    fn given_default_config_when_generated_then_parses_back() {
        let text = generate_default_config();

        let parsed: Settings = toml::from_str(&text).unwrap();

        assert!(parsed.plugins.contains_key("chrome"));
        assert!(parsed.plugins.contains_key("firefox"));
        assert!(parsed.cache_dir.is_none());
    }
}
