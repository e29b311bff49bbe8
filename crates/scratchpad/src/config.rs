use anyhow::Result;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

const USER_STYLE_FILE: &str = "spstyle.json";
const BUNDLED_STYLE_FILE: &str = "style.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub editor_foreground: Option<String>,
    #[serde(default)]
    pub editor_background: Option<String>,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub status_background: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    pub tab_size: usize,
    pub use_spaces: bool,
    pub line_numbers: bool,
    pub highlight_current_line: bool,
}

/// Theme and asset root, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Appearance {
    pub theme: Theme,
    pub asset_root: Option<PathBuf>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: String::from("dark"),
            editor_foreground: Some(String::from("#D8DEE9")),
            editor_background: Some(String::from("#1E1E1E")),
            accent_color: Some(String::from("#FFD166")),
            status_background: Some(String::from("#005F87")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            editor: EditorConfig {
                tab_size: 4,
                use_spaces: true,
                line_numbers: true,
                highlight_current_line: true,
            },
        }
    }
}

impl Theme {
    /// Parse a `#RRGGBB` colour.
    pub fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
        let hex = value.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }

    /// Drop colours that do not parse and fill an empty name. Returns `true` if anything changed.
    fn sanitize(&mut self) -> bool {
        let mut changed = false;

        if self.name.trim().is_empty() {
            log::warn!("Empty theme name, using default");
            self.name = "dark".to_string();
            changed = true;
        }

        for (label, color) in [
            ("editor_foreground", &mut self.editor_foreground),
            ("editor_background", &mut self.editor_background),
            ("accent_color", &mut self.accent_color),
            ("status_background", &mut self.status_background),
        ] {
            if let Some(value) = color.as_deref() {
                if Self::parse_hex(value).is_none() {
                    log::warn!("Invalid {} colour: {}, ignoring", label, value);
                    *color = None;
                    changed = true;
                }
            }
        }

        changed
    }
}

impl Config {
    /// Load the config file, falling back to (and writing) defaults when it
    /// is missing, unreadable, empty or broken.
    pub async fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            log::warn!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        if let Some(config) = Self::read_from(&path).await? {
            return Ok(config);
        }

        let config = Self::default();
        if let Err(e) = config.save().await {
            log::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    async fn read_from(path: &Path) -> Result<Option<Self>> {
        match try_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                log::info!("No config at {}, writing defaults", path.display());
                return Ok(None);
            }
            Err(e) => {
                log::error!("Cannot stat config {}: {}", path.display(), e);
                return Ok(None);
            }
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Cannot read config {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let parsed = if content.trim().is_empty() {
            Err("file is empty".to_string())
        } else {
            serde_json::from_str::<Self>(&content).map_err(|e| e.to_string())
        };

        match parsed {
            Ok(mut config) => {
                config.validate()?;
                log::info!("Loaded config from {}", path.display());
                Ok(Some(config))
            }
            Err(reason) => {
                log::error!("Ignoring config {}: {}", path.display(), reason);
                back_up(path).await;
                Ok(None)
            }
        }
    }

    pub async fn save(&self) -> Result<()> {
        let Some(config_path) = Self::config_path() else {
            return Ok(());
        };

        let mut config_to_save = self.clone();
        config_to_save.validate()?;

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
        tokio::fs::write(&config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            )
        })?;

        log::info!("Successfully saved config to: {}", config_path.display());
        Ok(())
    }

    /// Validate configuration values and fix invalid ones
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        if self.editor.tab_size == 0 || self.editor.tab_size > 16 {
            log::warn!("Invalid tab size: {}, using default", self.editor.tab_size);
            self.editor.tab_size = 4;
            has_issues = true;
        }

        if self.theme.sanitize() {
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    /// Pick the theme: the user's style override, then the bundled style in
    /// the asset root, then the configured theme.
    pub async fn resolve_appearance(&self) -> Appearance {
        let user_style = BaseDirs::new().map(|dirs| dirs.home_dir().join(USER_STYLE_FILE));
        let asset_root = Self::asset_root();
        self.resolve_appearance_from(user_style.as_deref(), asset_root)
            .await
    }

    async fn resolve_appearance_from(
        &self,
        user_style: Option<&Path>,
        asset_root: Option<PathBuf>,
    ) -> Appearance {
        let bundled_style = asset_root.as_ref().map(|root| root.join(BUNDLED_STYLE_FILE));

        for candidate in [user_style, bundled_style.as_deref()].into_iter().flatten() {
            if let Some(theme) = read_theme(candidate).await {
                log::info!("Loaded style from: {}", candidate.display());
                return Appearance { theme, asset_root };
            }
        }

        Appearance {
            theme: self.theme.clone(),
            asset_root,
        }
    }

    /// Directory holding bundled assets such as `style.json`.
    pub fn asset_root() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("SCRATCHPAD_ASSET_DIR") {
            return Some(PathBuf::from(dir));
        }

        ProjectDirs::from("com", "scratchpad", "scratchpad").map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SCRATCHPAD_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("SCRATCHPAD_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "scratchpad", "scratchpad")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

/// Keep a copy of a config we are about to overwrite.
async fn back_up(path: &Path) {
    let backup = path.with_extension("bak");
    match tokio::fs::copy(path, &backup).await {
        Ok(_) => log::info!("Kept old config as {}", backup.display()),
        Err(e) => log::warn!("Could not back up {}: {}", path.display(), e),
    }
}

async fn read_theme(path: &Path) -> Option<Theme> {
    if !try_exists(path).await.unwrap_or(false) {
        return None;
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Error loading style {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<Theme>(&content) {
        Ok(mut theme) => {
            theme.sanitize();
            Some(theme)
        }
        Err(e) => {
            log::warn!("Ignoring invalid style {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn config_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn write_theme(dir: &Path, file: &str, name: &str) -> PathBuf {
        let theme = Theme {
            name: name.to_string(),
            ..Theme::default()
        };
        let path = dir.join(file);
        std::fs::write(&path, serde_json::to_string(&theme).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.theme.name, "dark");
        assert_eq!(config.editor.tab_size, 4);
        assert!(config.editor.use_spaces);
        assert!(config.editor.line_numbers);
        assert!(config.editor.highlight_current_line);
        assert_eq!(config.theme.editor_background.as_deref(), Some("#1E1E1E"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"theme\""));
        assert!(json.contains("\"editor\""));

        let from_json: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.theme, from_json.theme);
        assert_eq!(config.editor.tab_size, from_json.editor.tab_size);
    }

    #[test]
    fn test_validate_repairs_values() {
        let mut config = Config::default();
        config.editor.tab_size = 0;
        config.theme.name = "  ".into();
        config.theme.accent_color = Some("yellow".into());

        config.validate().unwrap();
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.theme.name, "dark");
        assert!(config.theme.accent_color.is_none());
        assert!(config.theme.editor_foreground.is_some());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Theme::parse_hex("#FFD166"), Some((0xFF, 0xD1, 0x66)));
        assert_eq!(Theme::parse_hex("FFD166"), None);
        assert_eq!(Theme::parse_hex("#FFF"), None);
        assert_eq!(Theme::parse_hex("#GGGGGG"), None);
    }

    #[tokio::test]
    async fn test_config_load_from_env_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r##"{"theme":{"name":"light","editor_background":"#FFFFFF"},
                "editor":{"tab_size":2,"use_spaces":false,"line_numbers":false,"highlight_current_line":true}}"##,
        )
        .unwrap();

        let previous = {
            let _guard = config_test_lock().lock().unwrap();
            let previous = std::env::var("SCRATCHPAD_CONFIG_PATH").ok();
            std::env::set_var("SCRATCHPAD_CONFIG_PATH", &path);
            previous
        }; // release lock before await

        let config = Config::load().await.unwrap();

        match previous {
            Some(value) => std::env::set_var("SCRATCHPAD_CONFIG_PATH", value),
            None => std::env::remove_var("SCRATCHPAD_CONFIG_PATH"),
        }

        assert_eq!(config.theme.name, "light");
        assert_eq!(config.editor.tab_size, 2);
        assert!(!config.editor.use_spaces);
        assert!(config.theme.editor_foreground.is_none());
    }

    #[tokio::test]
    async fn test_user_style_takes_precedence() {
        let home = TempDir::new().unwrap();
        let assets = TempDir::new().unwrap();
        let user_style = write_theme(home.path(), USER_STYLE_FILE, "user");
        write_theme(assets.path(), BUNDLED_STYLE_FILE, "bundled");

        let appearance = Config::default()
            .resolve_appearance_from(Some(&user_style), Some(assets.path().to_path_buf()))
            .await;
        assert_eq!(appearance.theme.name, "user");
        assert_eq!(appearance.asset_root.as_deref(), Some(assets.path()));
    }

    #[tokio::test]
    async fn test_bundled_style_used_without_user_style() {
        let home = TempDir::new().unwrap();
        let assets = TempDir::new().unwrap();
        write_theme(assets.path(), BUNDLED_STYLE_FILE, "bundled");

        let missing = home.path().join(USER_STYLE_FILE);
        let appearance = Config::default()
            .resolve_appearance_from(Some(&missing), Some(assets.path().to_path_buf()))
            .await;
        assert_eq!(appearance.theme.name, "bundled");
    }

    #[tokio::test]
    async fn test_invalid_style_falls_back_to_config_theme() {
        let home = TempDir::new().unwrap();
        let user_style = home.path().join(USER_STYLE_FILE);
        std::fs::write(&user_style, "not json").unwrap();

        let appearance = Config::default()
            .resolve_appearance_from(Some(&user_style), None)
            .await;
        assert_eq!(appearance.theme, Theme::default());
        assert!(appearance.asset_root.is_none());
    }

    #[tokio::test]
    async fn test_broken_config_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Config::read_from(&path).await.unwrap().is_none());
        let backup = std::fs::read_to_string(temp_dir.path().join("config.bak")).unwrap();
        assert_eq!(backup, "{ not json");

        std::fs::write(&path, "   \n").unwrap();
        assert!(Config::read_from(&path).await.unwrap().is_none());

        let missing = temp_dir.path().join("absent.json");
        assert!(Config::read_from(&missing).await.unwrap().is_none());
        assert!(!temp_dir.path().join("absent.bak").exists());
    }

    #[tokio::test]
    async fn test_unreadable_config_location_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("plain-file");
        std::fs::write(&not_a_dir, "x").unwrap();

        // Stat fails with ENOTDIR rather than NotFound
        let path = not_a_dir.join("config.json");
        assert!(Config::read_from(&path).await.unwrap().is_none());
    }
}
