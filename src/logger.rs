use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::navigate::NavigateError;
use crate::record::SearchParameters;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Only show progress bar and final summary
    Summary = 1,  // High-level run progress (default)
    Detailed = 2, // Per-slot steps, skips, warnings
    Debug = 3,    // All messages including debug info
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }
}

#[derive(Clone)]
pub struct RunLogger {
    verbosity: VerbosityLevel,
    progress_bar: Arc<RwLock<Option<ProgressBar>>>,
    run_metadata: Arc<Mutex<RunMetadata>>,
    log_buffer: Arc<Mutex<Vec<String>>>,
    log_file_path: Option<String>,
}

#[derive(Default, Clone)]
struct RunMetadata {
    start_time: Option<SystemTime>,
    end_time: Option<SystemTime>,
    searches_processed: usize,
    searches_skipped: usize,
    searches_failed: usize,
    slots_skipped: usize,
    records_extracted: usize,
    reviews_extracted: usize,
    sessions_recreated: usize,
    output_file: String,
}

impl RunLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            run_metadata: Arc::new(Mutex::new(RunMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: None,
        }
    }

    pub fn with_log_file(verbosity: VerbosityLevel, log_file_path: String) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            run_metadata: Arc::new(Mutex::new(RunMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: Some(log_file_path),
        }
    }

    // Core logging functions with consistent timestamp formatting
    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("WARN", message);
        }
    }

    pub fn error(&self, message: &str) {
        // Always shown regardless of verbosity
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        let timestamp = self.get_timestamp();
        let msg = format!("[{}] {}: {}", timestamp, level, message);

        // Store in log buffer if log file export is enabled
        if self.log_file_path.is_some() {
            if let Ok(mut buffer) = self.log_buffer.lock() {
                buffer.push(msg.clone());
            }
        }

        // Route through the progress bar when one is active so the bar
        // keeps its fixed position
        if let Ok(guard) = self.progress_bar.try_read() {
            if let Some(pb) = guard.as_ref() {
                pb.println(msg);
                return;
            }
        }

        eprintln!("{}", msg);
    }

    fn get_timestamp(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let secs = now.as_secs();
        let millis = now.subsec_millis();

        let hours = (secs / 3600) % 24;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    // Progress bar management
    pub async fn start_progress(&self, total_steps: u64) {
        let pb = ProgressBar::new(total_steps);

        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| {
                    ProgressStyle::default_bar()
                        .template("{bar:40} {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                })
                .progress_chars("##-"),
        );

        pb.set_message("Starting...");

        let mut progress_guard = self.progress_bar.write().await;
        *progress_guard = Some(pb);

        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.start_time = Some(SystemTime::now());
    }

    pub async fn update_progress(&self, message: &str) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.set_message(message.to_string());
        }
    }

    pub async fn advance_progress(&self, steps: u64) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.inc(steps);
        }
    }

    pub async fn finish_progress(&self, final_message: &str) {
        let mut progress_guard = self.progress_bar.write().await;
        if let Some(pb) = progress_guard.take() {
            pb.finish_and_clear();
        }

        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.end_time = Some(SystemTime::now());
        drop(metadata);

        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", final_message);
        }
    }

    // Metadata recording functions
    pub fn record_search_processed(&self) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.searches_processed += 1;
    }

    pub fn record_search_skipped(&self) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.searches_skipped += 1;
    }

    pub fn record_search_failed(&self) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.searches_failed += 1;
    }

    pub fn record_slot_skipped(&self) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.slots_skipped += 1;
    }

    pub fn record_records_extracted(&self, count: usize) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.records_extracted = count;
    }

    pub fn record_reviews_extracted(&self, count: usize) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.reviews_extracted = count;
    }

    pub fn record_output_file(&self, path: &str) {
        let mut metadata = self.run_metadata.lock().unwrap();
        if metadata.output_file.is_empty() {
            metadata.output_file = path.to_string();
        } else {
            metadata.output_file = format!("{}, {}", metadata.output_file, path);
        }
    }

    // Final summary message
    pub fn print_final_summary(&self) {
        let metadata = self.run_metadata.lock().unwrap();

        // Clear any remaining progress bar artifacts
        print!("\x1b[2K\r");
        io::stdout().flush().unwrap();

        println!("\n=== SCRAPE SUMMARY ===");

        if let (Some(start), Some(end)) = (metadata.start_time, metadata.end_time) {
            let duration = end.duration_since(start).unwrap_or_default();
            println!("Run Duration: {:.2}s", duration.as_secs_f64());
        }

        println!("Searches Processed: {}", metadata.searches_processed);
        println!("Searches Skipped (not found): {}", metadata.searches_skipped);
        println!("Searches Failed: {}", metadata.searches_failed);
        println!("Listing Slots Skipped: {}", metadata.slots_skipped);
        println!("Agency Records: {}", metadata.records_extracted);
        println!("Review Entries: {}", metadata.reviews_extracted);
        println!("Sessions Recreated: {}", metadata.sessions_recreated);

        if !metadata.output_file.is_empty() {
            println!("Local Copies: {}", metadata.output_file);
        }

        println!("======================\n");

        if metadata.records_extracted > 0 {
            println!(
                "✅ Scrape completed successfully! Extracted {} agency records.",
                metadata.records_extracted
            );
        } else {
            println!("✅ Scrape completed. No agency records extracted.");
        }
    }

    // Specialized logging methods for the run phases
    pub fn log_search_start(&self, params: &SearchParameters, position: usize, total: usize) {
        self.info(&format!(
            "Searching for \"{}\" ({}/{})",
            params, position, total
        ));
    }

    pub fn log_navigation_skip(&self, err: &NavigateError) {
        self.warn(&format!("{}, skipping...", err));
    }

    pub fn log_end_of_results(&self, index: usize) {
        self.debug(&format!("No more agency items at index {}", index));
    }

    pub fn log_profile_link_missing(&self, item: usize) {
        self.record_slot_skipped();
        self.warn(&format!(
            "Profile link not found in overlay for item {}, skipping...",
            item
        ));
    }

    pub fn log_no_tab_detected(&self, item: usize) {
        self.record_slot_skipped();
        self.warn(&format!(
            "No new tab detected for profile link at item {}",
            item
        ));
    }

    pub fn log_slot_scraped(&self, title: &str) {
        self.info(&format!("Scraped data for: {}", title));
    }

    pub fn log_slot_error(&self, item: usize, params: &SearchParameters, error: &anyhow::Error) {
        self.record_slot_skipped();
        self.warn(&format!(
            "Error processing agency {} for \"{}\": {}",
            item, params, error
        ));
    }

    pub fn log_search_error(&self, params: &SearchParameters, error: &anyhow::Error) {
        self.warn(&format!("Error searching for \"{}\": {}", params, error));
    }

    pub fn log_session_recreated(&self) {
        let mut metadata = self.run_metadata.lock().unwrap();
        metadata.sessions_recreated += 1;
        drop(metadata);
        self.warn("Browser session unresponsive, recreating...");
    }

    pub fn log_input_rows(&self, count: usize, worksheet: &str) {
        self.info(&format!(
            "Loaded {} search rows from worksheet '{}'",
            count, worksheet
        ));
    }

    pub fn log_sheet_write(&self, worksheet: &str, data_rows: usize) {
        self.info(&format!(
            "Wrote {} rows to worksheet '{}'",
            data_rows, worksheet
        ));
    }

    pub fn log_export_success(&self, path: &str) {
        self.record_output_file(path);
        self.info(&format!("Export completed: {}", path));
    }

    /// Export all collected logs to the specified file
    pub fn export_logs(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref log_file_path) = self.log_file_path {
            if let Ok(buffer) = self.log_buffer.lock() {
                if let Some(parent) = Path::new(log_file_path).parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let mut file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(log_file_path)?;

                for log_entry in buffer.iter() {
                    writeln!(file, "{}", log_entry)?;
                }

                file.flush()?;
                return Ok(());
            }
        }
        Ok(())
    }

    pub fn is_log_export_enabled(&self) -> bool {
        self.log_file_path.is_some()
    }

    pub fn get_log_count(&self) -> usize {
        if let Ok(buffer) = self.log_buffer.lock() {
            buffer.len()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_verbose_count() {
        assert_eq!(
            VerbosityLevel::from_verbose_count(0),
            VerbosityLevel::Summary
        );
        assert_eq!(
            VerbosityLevel::from_verbose_count(1),
            VerbosityLevel::Detailed
        );
        assert_eq!(VerbosityLevel::from_verbose_count(2), VerbosityLevel::Debug);
        assert_eq!(VerbosityLevel::from_verbose_count(7), VerbosityLevel::Debug);
    }

    #[test]
    fn test_log_buffer_only_with_log_file() {
        let plain = RunLogger::new(VerbosityLevel::Silent);
        plain.error("kept out of the buffer");
        assert_eq!(plain.get_log_count(), 0);
        assert!(!plain.is_log_export_enabled());

        let buffered =
            RunLogger::with_log_file(VerbosityLevel::Silent, "/tmp/agencyharvest.log".to_string());
        buffered.error("captured");
        assert_eq!(buffered.get_log_count(), 1);
        assert!(buffered.is_log_export_enabled());
    }
}
