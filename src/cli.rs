use clap::Parser;
use dirs;

#[derive(Parser, Debug)]
#[command(name = "agencyharvest")]
#[command(about = "Scrapes agency listings from the DesignRush directory into Google Sheets")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/agencyharvest.toml
    #[arg(long)]
    pub init: bool,

    /// Path to configuration file (defaults to ./config/agencyharvest.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Spreadsheet name to resolve through Drive (overrides config)
    #[arg(short, long, value_name = "NAME")]
    pub spreadsheet: Option<String>,

    /// Path to service-account credentials JSON (overrides config)
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<String>,

    /// Worksheet holding the search rows (overrides config)
    #[arg(long, value_name = "NAME")]
    pub input_worksheet: Option<String>,

    /// Worksheet receiving agency records (overrides config)
    #[arg(long, value_name = "NAME")]
    pub output_worksheet: Option<String>,

    /// Worksheet receiving the flattened review rows (overrides config)
    #[arg(long, value_name = "NAME")]
    pub reviews_worksheet: Option<String>,

    /// Maximum listing slots to process per search row (overrides config)
    #[arg(short, long, value_name = "N")]
    pub max_items: Option<usize>,

    /// Run Chrome headless even if the config says otherwise
    #[arg(long, conflicts_with = "visible")]
    pub headless: bool,

    /// Run Chrome with a visible window (overrides config)
    #[arg(long, conflicts_with = "headless")]
    pub visible: bool,

    /// Also write results and reviews as CSV files (directory defaults to Desktop)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub csv_export: Option<Option<String>>,

    /// Verbose logging (use -v for INFO, -vv for DEBUG with pacing details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Export execution logs to a file (specify file path)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<String>,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.spreadsheet {
            if name.trim().is_empty() {
                return Err("Spreadsheet name cannot be empty".to_string());
            }
        }

        for (flag, value) in [
            ("--input-worksheet", &self.input_worksheet),
            ("--output-worksheet", &self.output_worksheet),
            ("--reviews-worksheet", &self.reviews_worksheet),
        ] {
            if let Some(name) = value {
                if name.trim().is_empty() {
                    return Err(format!("{} cannot be empty", flag));
                }
            }
        }

        if self.max_items == Some(0) {
            return Err("Max items must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn get_default_output_dir() -> Result<String, String> {
        if let Some(desktop_dir) = dirs::desktop_dir() {
            Ok(desktop_dir.to_string_lossy().to_string())
        } else {
            // Fallback to current directory if Desktop can't be found
            Ok(".".to_string())
        }
    }

    /// Resolve the CSV export directory: `None` when export is off, the
    /// given directory when one was passed, Desktop otherwise.
    pub fn resolve_export_dir(&self) -> Result<Option<String>, String> {
        match &self.csv_export {
            None => Ok(None),
            Some(Some(dir)) => Ok(Some(dir.clone())),
            Some(None) => Self::get_default_output_dir().map(Some),
        }
    }
}
