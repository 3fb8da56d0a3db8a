use crate::domain::models::{PageDefinition, DEFAULT_PAGE_ID};
use crate::domain::registry::DEFAULT_STALE_AFTER;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "beacon_pages".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Beacon name -> page id
    #[serde(default = "default_beacon_pages")]
    pub beacon_pages: BTreeMap<String, String>,
    #[serde(default = "default_pages")]
    pub pages: Vec<PageDefinition>,
    #[serde(default = "default_page_id")]
    pub default_page: String,

    // Timing
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,
    #[serde(default = "default_prune_interval_ms")]
    pub prune_interval_ms: u64,
    #[serde(default = "default_select_interval_ms")]
    pub select_interval_ms: u64,

    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            beacon_pages: default_beacon_pages(),
            pages: default_pages(),
            default_page: default_page_id(),
            stale_after_ms: default_stale_after_ms(),
            prune_interval_ms: default_prune_interval_ms(),
            select_interval_ms: default_select_interval_ms(),
            log_settings: LogSettings::default(),
        }
    }
}

impl Settings {
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_millis(self.prune_interval_ms.max(1))
    }

    pub fn select_interval(&self) -> Duration {
        Duration::from_millis(self.select_interval_ms.max(1))
    }

    /// Page definitions, plus a bare container for any mapped or default
    /// page that has no definition. Repeated ids keep their first definition.
    pub fn page_definitions(&self) -> Vec<PageDefinition> {
        let mut seen = HashSet::new();
        let mut pages = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            if seen.insert(page.id.as_str()) {
                pages.push(page.clone());
            } else {
                warn!("Duplicate page id '{}' in settings, keeping the first", page.id);
            }
        }

        let referenced = std::iter::once(&self.default_page).chain(self.beacon_pages.values());
        for id in referenced {
            if !pages.iter().any(|p| &p.id == id) {
                pages.push(PageDefinition::new(id, id, ""));
            }
        }
        pages
    }
}

fn default_beacon_pages() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("canteen1".to_string(), "canteen".to_string()),
        ("library1".to_string(), "library".to_string()),
        ("classroom1".to_string(), "classroom".to_string()),
    ])
}
fn default_pages() -> Vec<PageDefinition> {
    vec![
        PageDefinition::new(
            DEFAULT_PAGE_ID,
            "Welcome",
            "Walk up to a beacon to see information about the place you are in.",
        ),
        PageDefinition::new(
            "canteen",
            "Canteen",
            "Today's lunch is served from 11:30 to 13:30.",
        ),
        PageDefinition::new(
            "library",
            "Library",
            "Please keep quiet. Books are due back within three weeks.",
        ),
        PageDefinition::new(
            "classroom",
            "Classroom",
            "Next lecture starts at 14:00.",
        ),
    ]
}
fn default_page_id() -> String {
    DEFAULT_PAGE_ID.to_string()
}
fn default_stale_after_ms() -> u64 {
    DEFAULT_STALE_AFTER.as_millis() as u64
}
fn default_prune_interval_ms() -> u64 {
    1_000
}
fn default_select_interval_ms() -> u64 {
    500
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
    // Problems hit while loading, reported once logging is up
    load_issues: Vec<String>,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::load(settings_path))
    }

    /// Load settings from `path`, falling back to defaults.
    ///
    /// On first run the defaults are written out so the beacon map can be
    /// edited by hand.
    fn load(settings_path: PathBuf) -> Self {
        let mut load_issues = Vec::new();
        let first_run = !settings_path.exists();

        let settings = if first_run {
            Settings::default()
        } else {
            Self::load_from_file(&settings_path).unwrap_or_else(|e| {
                load_issues.push(format!(
                    "Could not read {}, using defaults: {}",
                    settings_path.display(),
                    e
                ));
                Settings::default()
            })
        };

        let mut service = Self {
            settings,
            settings_path,
            load_issues,
        };
        if first_run {
            if let Err(e) = service.save() {
                let issue = format!(
                    "Could not write default settings to {}: {}",
                    service.settings_path.display(),
                    e
                );
                service.load_issues.push(issue);
            }
        }
        service
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Problems hit while loading. Empty when the file loaded cleanly.
    pub fn load_issues(&self) -> &[String] {
        &self.load_issues
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BeaconPages");
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.settings_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }
}
