//! Configuration management for agencyharvest
//!
//! All configuration is loaded from `./config/agencyharvest.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the config template.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pacing::DelayRange;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/agencyharvest.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/agencyharvest.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Invalid range in '{field}': [{min}, {max}] (min must not exceed max)")]
    InvalidRange { field: String, min: u64, max: u64 },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// Google Sheets input/output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Path to the service-account credentials JSON (client_email + private_key)
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Spreadsheet resolved by name through the Drive API at run start
    #[serde(default = "default_spreadsheet_name")]
    pub spreadsheet_name: String,
    #[serde(default = "default_input_worksheet")]
    pub input_worksheet: String,
    #[serde(default = "default_output_worksheet")]
    pub output_worksheet: String,
    #[serde(default = "default_reviews_worksheet")]
    pub reviews_worksheet: String,
    /// API endpoints, overridable for tests against a local mock
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Chrome session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,
    /// Viewport dimensions sampled once per run from these inclusive ranges
    #[serde(default = "default_viewport_width")]
    pub viewport_width: [u32; 2],
    #[serde(default = "default_viewport_height")]
    pub viewport_height: [u32; 2],
    /// User-agent pool, one entry sampled per run
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

/// Directory navigation and extraction pacing
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_home_url")]
    pub home_url: String,
    /// Upper bound on listing slots processed per search row
    #[serde(default = "default_max_items_per_keyword")]
    pub max_items_per_keyword: usize,
    /// Page loads, clicks, and tab switches
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: DelayRange,
    /// Scroll settling and tab-poll backoff
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: DelayRange,
    /// Pause between parameter sets
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: DelayRange,
    #[serde(default = "default_tab_poll_attempts")]
    pub tab_poll_attempts: u32,
}

fn default_credentials_path() -> String {
    "./config/service-account.json".to_string()
}

fn default_spreadsheet_name() -> String {
    "Agency Directory Scrape".to_string()
}

fn default_input_worksheet() -> String {
    "input".to_string()
}

fn default_output_worksheet() -> String {
    "output".to_string()
}

fn default_reviews_worksheet() -> String {
    "reviews".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_headless() -> bool {
    true
}

fn default_page_load_timeout_secs() -> u64 {
    30
}

fn default_element_timeout_secs() -> u64 {
    10
}

fn default_viewport_width() -> [u32; 2] {
    [1200, 1600]
}

fn default_viewport_height() -> [u32; 2] {
    [700, 1000]
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0".to_string(),
    ]
}

fn default_home_url() -> String {
    "https://www.designrush.com".to_string()
}

fn default_max_items_per_keyword() -> usize {
    3
}

fn default_base_delay_ms() -> DelayRange {
    DelayRange::new(500, 1200)
}

fn default_step_delay_ms() -> DelayRange {
    DelayRange::new(300, 600)
}

fn default_search_delay_ms() -> DelayRange {
    DelayRange::new(500, 1000)
}

fn default_tab_poll_attempts() -> u32 {
    10
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            spreadsheet_name: default_spreadsheet_name(),
            input_worksheet: default_input_worksheet(),
            output_worksheet: default_output_worksheet(),
            reviews_worksheet: default_reviews_worksheet(),
            sheets_base_url: default_sheets_base_url(),
            drive_base_url: default_drive_base_url(),
            token_url: default_token_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            element_timeout_secs: default_element_timeout_secs(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            user_agents: default_user_agents(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            max_items_per_keyword: default_max_items_per_keyword(),
            base_delay_ms: default_base_delay_ms(),
            step_delay_ms: default_step_delay_ms(),
            search_delay_ms: default_search_delay_ms(),
            tab_poll_attempts: default_tab_poll_attempts(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate sheets config
        for (field, value) in [
            ("sheets.credentials_path", &self.sheets.credentials_path),
            ("sheets.spreadsheet_name", &self.sheets.spreadsheet_name),
            ("sheets.input_worksheet", &self.sheets.input_worksheet),
            ("sheets.output_worksheet", &self.sheets.output_worksheet),
            ("sheets.reviews_worksheet", &self.sheets.reviews_worksheet),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: field.to_string(),
                });
            }
        }
        for (field, url) in [
            ("sheets.sheets_base_url", &self.sheets.sheets_base_url),
            ("sheets.drive_base_url", &self.sheets.drive_base_url),
            ("sheets.token_url", &self.sheets.token_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: url.clone(),
                });
            }
        }
        if self.sheets.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "sheets.request_timeout_secs".to_string(),
            });
        }

        // Validate browser config
        if self.browser.page_load_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "browser.page_load_timeout_secs".to_string(),
            });
        }
        if self.browser.element_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "browser.element_timeout_secs".to_string(),
            });
        }
        self.validate_dimension("browser.viewport_width", self.browser.viewport_width)?;
        self.validate_dimension("browser.viewport_height", self.browser.viewport_height)?;
        if self.browser.user_agents.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "browser.user_agents".to_string(),
            });
        }

        // Validate scrape config
        if !self.scrape.home_url.starts_with("http://")
            && !self.scrape.home_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl {
                field: "scrape.home_url".to_string(),
                url: self.scrape.home_url.clone(),
            });
        }
        if self.scrape.max_items_per_keyword == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "scrape.max_items_per_keyword".to_string(),
            });
        }
        if self.scrape.tab_poll_attempts == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "scrape.tab_poll_attempts".to_string(),
            });
        }
        self.validate_delay("scrape.base_delay_ms", self.scrape.base_delay_ms)?;
        self.validate_delay("scrape.step_delay_ms", self.scrape.step_delay_ms)?;
        self.validate_delay("scrape.search_delay_ms", self.scrape.search_delay_ms)?;

        Ok(())
    }

    fn validate_dimension(&self, field: &str, bounds: [u32; 2]) -> Result<(), ConfigError> {
        if bounds[0] == 0 || bounds[0] > bounds[1] {
            return Err(ConfigError::InvalidRange {
                field: field.to_string(),
                min: bounds[0] as u64,
                max: bounds[1] as u64,
            });
        }
        Ok(())
    }

    fn validate_delay(&self, field: &str, range: DelayRange) -> Result<(), ConfigError> {
        if !range.is_ordered() {
            return Err(ConfigError::InvalidRange {
                field: field.to_string(),
                min: range.min_ms,
                max: range.max_ms,
            });
        }
        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write default config
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
