use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration as TOML with every field commented out and documented
    pub fn generate_default_config(&self) -> Result<String> {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;

        Ok(Self::comment_all_fields(toml_str, Self::collect_all_comments()))
    }

    /// Collect all field comments into a map keyed by `section.field`
    fn collect_all_comments() -> HashMap<String, String> {
        let mut comments = HashMap::new();

        for (field, comment) in APP_COMMENTS {
            comments.insert(field.to_string(), comment.to_string());
        }

        let sections: [(&str, &[(&str, &str)]); 5] = [
            ("data", DATA_COMMENTS),
            ("insights", INSIGHTS_COMMENTS),
            ("chart", CHART_COMMENTS),
            ("performance", PERFORMANCE_COMMENTS),
            ("debug", DEBUG_COMMENTS),
        ];
        for (section, fields) in sections {
            for (field, comment) in fields {
                comments.insert(format!("{}.{}", section, field), comment.to_string());
            }
        }

        comments
    }

    /// Comment out all fields in TOML and add comments.
    /// Unset Option fields are added back as commented-out `# field = "..."` examples.
    fn comment_all_fields(toml: String, comments: HashMap<String, String>) -> String {
        let mut result = String::new();
        result.push_str("# cropscope configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();
        let mut seen_fields: HashSet<String> = HashSet::new();

        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                current_section = section.clone();

                if let Some(header) = SECTION_HEADERS.iter().find(|(s, _)| s == &section) {
                    result.push_str(header.1);
                    result.push('\n');
                }

                result.push_str("# ");
                result.push_str(line);
                result.push('\n');

                for (path, example) in OPTION_FIELD_EXAMPLES {
                    let Some((sec, field)) = path.split_once('.') else {
                        continue;
                    };
                    if sec != section {
                        continue;
                    }
                    if let Some(comment) = comments.get(*path) {
                        Self::push_comment(&mut result, comment);
                    }
                    result.push_str(&format!("# {} = {}\n", field, example));
                    seen_fields.insert(path.to_string());
                }
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                if seen_fields.insert(field_path.clone()) {
                    if let Some(comment) = comments.get(&field_path) {
                        Self::push_comment(&mut result, comment);
                    }
                }
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        result
    }

    fn push_comment(out: &mut String, comment: &str) {
        for comment_line in comment.lines() {
            out.push_str("# ");
            out.push_str(comment_line);
            out.push('\n');
        }
    }

    /// Section name from a TOML line like "[performance]"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            None
        }
    }

    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }

        let (field_name, _) = trimmed.split_once('=')?;
        let field_name = field_name.trim();
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;

        let template = self.generate_default_config()?;
        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub data: DataConfig,
    pub insights: InsightsConfig,
    pub chart: ChartConfig,
    pub performance: PerformanceConfig,
    pub debug: DebugConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "data",
        "# ============================================================================\n# Dataset Source\n# ============================================================================",
    ),
    (
        "insights",
        "# ============================================================================\n# Insight Reports\n# ============================================================================",
    ),
    (
        "chart",
        "# ============================================================================\n# Chart Export\n# ============================================================================",
    ),
    (
        "performance",
        "# ============================================================================\n# Performance Settings\n# ============================================================================",
    ),
    (
        "debug",
        "# ============================================================================\n# Debug Settings\n# ============================================================================",
    ),
];

/// Option fields are not serialized when unset; they are shown with these example values.
const OPTION_FIELD_EXAMPLES: &[(&str, &str)] = &[
    ("data.path", "\"data_season.csv\""),
    ("data.delimiter", "\",\""),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataConfig {
    /// Dataset used when no path is given on the command line
    pub path: Option<PathBuf>,
    /// Field delimiter of the dataset file
    pub delimiter: Option<char>,
}

const DATA_COMMENTS: &[(&str, &str)] = &[
    (
        "path",
        "Dataset used when no PATH argument is given\nIf not specified, data_season.csv in the working directory is used",
    ),
    (
        "delimiter",
        "Field delimiter of the dataset file (single character)\nIf not specified, comma is used",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub top_n: usize,
    pub decimals: usize,
}

const INSIGHTS_COMMENTS: &[(&str, &str)] = &[
    (
        "top_n",
        "Number of crops listed in each Top Performers ranking",
    ),
    (
        "decimals",
        "Decimal places for metrics in the per-crop report",
    ),
];

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            decimals: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

const CHART_COMMENTS: &[(&str, &str)] = &[
    ("width", "Width in pixels of exported PNG charts"),
    ("height", "Height in pixels of exported PNG charts"),
];

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

const PERFORMANCE_COMMENTS: &[(&str, &str)] = &[(
    "event_poll_interval_ms",
    "Event polling interval in milliseconds\nLower values = more responsive but higher CPU usage",
)];

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_level: String,
}

const DEBUG_COMMENTS: &[(&str, &str)] = &[
    (
        "enabled",
        "Log at debug level (same as --debug)",
    ),
    (
        "log_level",
        "Log filter when debug is off: error, warn, info, debug or trace\nAccepts tracing-subscriber directives such as \"cropscope=debug\"",
    ),
];

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_level: "info".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            data: DataConfig::default(),
            insights: InsightsConfig::default(),
            chart: ChartConfig::default(),
            performance: PerformanceConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load from the `config.toml` managed by `config_manager`. A missing file gives defaults;
    /// an unreadable or invalid one is an error.
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();

        let config_path = config_manager.config_path("config.toml");
        if config_path.exists() {
            config.merge(Self::read_file(&config_path)?);
        }

        config.validate()?;
        tracing::debug!(path = %config_path.display(), "configuration loaded");

        Ok(config)
    }

    fn read_file(config_path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.data.merge(other.data);
        self.insights.merge(other.insights);
        self.chart.merge(other.chart);
        self.performance.merge(other.performance);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if let Some(d) = self.data.delimiter {
            if !d.is_ascii() {
                return Err(eyre!("delimiter must be a single ASCII character, got '{}'", d));
            }
        }

        if self.insights.top_n == 0 {
            return Err(eyre!("top_n must be greater than 0"));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(eyre!("chart width and height must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.debug.log_level.trim().is_empty() {
            return Err(eyre!("log_level must not be empty"));
        }

        Ok(())
    }
}

impl DataConfig {
    pub fn merge(&mut self, other: Self) {
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
    }
}

impl InsightsConfig {
    pub fn merge(&mut self, other: Self) {
        let default = InsightsConfig::default();
        if other.top_n != default.top_n {
            self.top_n = other.top_n;
        }
        if other.decimals != default.decimals {
            self.decimals = other.decimals;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.log_level != default.log_level {
            self.log_level = other.log_level;
        }
    }
}
