// Allow dead code for functions that are part of the API surface but not used in all code paths
#![allow(dead_code)]

use anyhow::Result;
use clap::Parser;
use std::path::Path;

mod cli;
mod config;
mod driver;
mod export;
mod extract;
mod listings;
mod logger;
mod navigate;
mod pacing;
mod record;
mod run;
mod session;
mod sheets;

use cli::Cli;
use config::AppConfig;
use logger::{RunLogger, VerbosityLevel};
use session::{BrowserSession, SessionProfile};
use sheets::SheetsClient;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Handle --init flag first (before any other processing)
    if args.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run agencyharvest again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Load configuration. An explicit --config path must exist; the default
    // path falls back to an interactive create prompt.
    let mut app_config = match &args.config {
        Some(path) => match AppConfig::load_from_path(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
        None => match AppConfig::load() {
            Ok(cfg) => cfg,
            Err(config::ConfigError::FileNotFound(path)) => {
                match AppConfig::prompt_create_config() {
                    Ok(Some(created_path)) => {
                        println!(
                            "✅ Created default configuration file at: {}",
                            created_path.display()
                        );
                        println!(
                            "   Edit this file to customize settings, then run agencyharvest again."
                        );
                        std::process::exit(0);
                    }
                    Ok(None) => {
                        eprintln!("❌ Configuration file not found at: {}", path.display());
                        eprintln!("   Run with --init to create a default configuration file.");
                        std::process::exit(1);
                    }
                    Err(e) => {
                        eprintln!("❌ Failed to create configuration file: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    };

    // Apply CLI overrides on top of the loaded configuration
    if let Some(name) = &args.spreadsheet {
        app_config.sheets.spreadsheet_name = name.clone();
    }
    if let Some(path) = &args.credentials {
        app_config.sheets.credentials_path = path.clone();
    }
    if let Some(worksheet) = &args.input_worksheet {
        app_config.sheets.input_worksheet = worksheet.clone();
    }
    if let Some(worksheet) = &args.output_worksheet {
        app_config.sheets.output_worksheet = worksheet.clone();
    }
    if let Some(worksheet) = &args.reviews_worksheet {
        app_config.sheets.reviews_worksheet = worksheet.clone();
    }
    if let Some(max_items) = args.max_items {
        app_config.scrape.max_items_per_keyword = max_items;
    }
    if args.visible {
        app_config.browser.headless = false;
    } else if args.headless {
        app_config.browser.headless = true;
    }

    // Initialize logging
    let verbosity = VerbosityLevel::from_verbose_count(args.verbose);
    let logger = match &args.log_file {
        Some(log_file_path) => RunLogger::with_log_file(verbosity, log_file_path.clone()),
        None => RunLogger::new(verbosity),
    };

    // Validate arguments
    if let Err(e) = args.validate() {
        logger.error(&format!("Invalid arguments: {}", e));
        std::process::exit(1);
    }

    let export_dir = match args.resolve_export_dir() {
        Ok(dir) => dir,
        Err(e) => {
            logger.error(&format!("Failed to determine export directory: {}", e));
            std::process::exit(1);
        }
    };

    // Authenticate and resolve the spreadsheet before touching the browser
    let sheets = match SheetsClient::connect(&app_config.sheets).await {
        Ok(client) => client,
        Err(e) => {
            logger.error(&format!("Google Sheets authentication failed: {:#}", e));
            std::process::exit(1);
        }
    };
    let spreadsheet_id = match sheets
        .resolve_spreadsheet_id(&app_config.sheets.spreadsheet_name)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            logger.error(&format!("Spreadsheet lookup failed: {:#}", e));
            std::process::exit(1);
        }
    };

    let params_list = match sheets
        .read_input_rows(&spreadsheet_id, &app_config.sheets.input_worksheet)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            logger.error(&format!("Failed to read input rows: {:#}", e));
            std::process::exit(1);
        }
    };

    if params_list.is_empty() {
        println!(
            "No search rows found in worksheet '{}'.",
            app_config.sheets.input_worksheet
        );
        println!("Add rows with a business keyword in column A and a category in column B, then run again.");
        return Ok(());
    }
    logger.log_input_rows(params_list.len(), &app_config.sheets.input_worksheet);

    // One browser identity per run; recreated sessions reuse it
    let profile = SessionProfile::sample(&app_config.browser);
    logger.start_progress(params_list.len() as u64).await;

    let browser_config = app_config.browser.clone();
    let records = match run::run_searches(
        || BrowserSession::create(&browser_config, &profile),
        &params_list,
        &app_config.scrape,
        &logger,
    )
    .await
    {
        Ok(records) => records,
        Err(e) => {
            logger.finish_progress("Scrape aborted").await;
            logger.error(&format!("Browser session could not be created: {:#}", e));
            std::process::exit(1);
        }
    };
    logger.finish_progress("Scrape completed").await;

    if records.is_empty() {
        println!();
        println!("No agency records were extracted. Possible reasons:");
        println!("  - the business or category names in the sheet do not match the directory menus");
        println!("  - the directory markup changed and the listing selectors no longer match");
        println!("  - no profile tab opened within the polling window for any listing");
        logger.print_final_summary();
        return Ok(());
    }

    let review_total: usize = records.iter().map(|r| r.reviews.len()).sum();
    logger.record_records_extracted(records.len());
    logger.record_reviews_extracted(review_total);

    // Write both tables back to the spreadsheet
    let result_table = record::result_rows(&records);
    if let Err(e) = sheets
        .write_table(&spreadsheet_id, &app_config.sheets.output_worksheet, &result_table)
        .await
    {
        logger.error(&format!("Failed to write results: {:#}", e));
        std::process::exit(1);
    }
    logger.log_sheet_write(&app_config.sheets.output_worksheet, result_table.len() - 1);

    let review_table = record::review_rows(&records);
    if let Err(e) = sheets
        .write_table(&spreadsheet_id, &app_config.sheets.reviews_worksheet, &review_table)
        .await
    {
        logger.error(&format!("Failed to write reviews: {:#}", e));
        std::process::exit(1);
    }
    logger.log_sheet_write(&app_config.sheets.reviews_worksheet, review_table.len() - 1);

    // Optional local CSV copies
    if let Some(dir) = &export_dir {
        let exported = export::export_results_csv(&records, dir)
            .and_then(|results_path| {
                export::export_reviews_csv(&records, dir).map(|reviews_path| (results_path, reviews_path))
            });
        match exported {
            Ok((results_path, reviews_path)) => {
                logger.log_export_success(&results_path.display().to_string());
                logger.log_export_success(&reviews_path.display().to_string());
            }
            Err(e) => {
                // Sheet writes already succeeded, so a failed local copy is not fatal
                logger.warn(&format!("CSV export failed: {:#}", e));
            }
        }
    }

    // Print final comprehensive summary
    logger.print_final_summary();

    // Export logs to file if enabled
    if logger.is_log_export_enabled() {
        match logger.export_logs() {
            Ok(()) => {
                if let Some(ref log_file) = args.log_file {
                    println!("📄 Execution logs exported to: {}", log_file);
                    println!("   Total log entries: {}", logger.get_log_count());
                }
            }
            Err(e) => {
                eprintln!("⚠️ Warning: Failed to export logs: {}", e);
            }
        }
    }

    Ok(())
}
