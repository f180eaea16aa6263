use anyhow::Result;
use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::record::{self, AgencyRecord};

const RESULTS_FILE: &str = "agency_results.csv";
const REVIEWS_FILE: &str = "agency_reviews.csv";

/// Write the agency record table to `{output_dir}/agency_results.csv`
pub fn export_results_csv(records: &[AgencyRecord], output_dir: &str) -> Result<PathBuf> {
    let path = Path::new(output_dir).join(RESULTS_FILE);
    debug!("Exporting {} agency records to CSV: {}", records.len(), path.display());

    fs::create_dir_all(output_dir)?;
    write_rows(&record::result_rows(records), &path)?;

    info!(
        "Successfully exported {} agency records to CSV: {}",
        records.len(),
        path.display()
    );
    Ok(path)
}

/// Write the flattened review table to `{output_dir}/agency_reviews.csv`
pub fn export_reviews_csv(records: &[AgencyRecord], output_dir: &str) -> Result<PathBuf> {
    let path = Path::new(output_dir).join(REVIEWS_FILE);
    let review_count: usize = records.iter().map(|r| r.reviews.len()).sum();
    debug!("Exporting {} review entries to CSV: {}", review_count, path.display());

    fs::create_dir_all(output_dir)?;
    write_rows(&record::review_rows(records), &path)?;

    info!(
        "Successfully exported {} review entries to CSV: {}",
        review_count,
        path.display()
    );
    Ok(path)
}

fn write_rows(rows: &[Vec<String>], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);

    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReviewEntry;
    use tempfile::TempDir;

    fn sample_record() -> AgencyRecord {
        AgencyRecord {
            search_name: "Branding | Marketing | ".to_string(),
            title: "Northwind Creative".to_string(),
            address: "12 Harbor St, Portland, OR".to_string(),
            website: "https://northwindcreative.example".to_string(),
            reviews: vec![ReviewEntry {
                author_name: "Dana R.".to_string(),
                author_position: "Marketing Director, Harborview".to_string(),
                review_item_title: "Great partner".to_string(),
                review_type: "Review".to_string(),
                review_description: "Delivered the rebrand ahead of schedule.".to_string(),
            }],
            ..AgencyRecord::default()
        }
    }

    #[test]
    fn test_export_results_csv_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let records = vec![sample_record()];

        let path = export_results_csv(&records, dir.path().to_str().unwrap()).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("Search Name,Title,"));
        let row = lines.next().unwrap();
        assert!(row.contains("Northwind Creative"));
        assert!(row.contains("Branding | Marketing | "));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_reviews_csv_flattens_per_review() {
        let dir = TempDir::new().unwrap();
        let mut record = sample_record();
        record.reviews.push(ReviewEntry {
            author_name: "Miguel A.".to_string(),
            ..ReviewEntry::default()
        });

        let path = export_reviews_csv(&[record], dir.path().to_str().unwrap()).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        // Header plus one row per review
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("Dana R."));
        assert!(content.contains("Miguel A."));
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("reports").join("latest");

        let path = export_results_csv(&[], nested.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
