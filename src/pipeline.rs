use crate::config::Config;
use crate::constants::IMPORT_SAMPLE_LIMIT;
use crate::db::{ImportSummary, JobStore};
use crate::error::{JobsDbError, Result};
use crate::types::{NormalizedRecord, RawRecord};
use std::fs;
use tracing::{debug, info, instrument};

/// Result of a clean run.
#[derive(Debug)]
pub struct CleanResult {
    pub records: usize,
    pub output_file: String,
}

/// Result of an import run.
#[derive(Debug)]
pub struct ImportReport {
    pub total_records: usize,
    pub summary: ImportSummary,
    pub total_rows: i64,
}

pub struct Pipeline;

impl Pipeline {
    /// Step 1: project the raw scraped records onto the fixed field set and
    /// write the normalized sequence as indented JSON. All-or-nothing: a
    /// file that fails to parse aborts the whole step.
    #[instrument(skip(config))]
    pub fn clean(config: &Config) -> Result<CleanResult> {
        let raw_path = &config.data.raw_file;
        if !raw_path.exists() {
            return Err(JobsDbError::MissingInput(format!(
                "{} not found",
                raw_path.display()
            )));
        }

        info!("Reading {}", raw_path.display());
        println!("Reading {}...", raw_path.display());
        let content = fs::read_to_string(raw_path)?;
        let raw_records: Vec<RawRecord> = serde_json::from_str(&content)?;
        info!("Loaded {} records", raw_records.len());
        println!("Loaded {} records", raw_records.len());

        let mut cleaned = Vec::with_capacity(raw_records.len());
        for (i, raw_record) in raw_records.iter().enumerate() {
            if i % 1000 == 0 {
                debug!("Processing record {}", i);
                println!("Processing record {i}...");
            }
            cleaned.push(NormalizedRecord::project(raw_record));
        }

        let cleaned_path = &config.data.cleaned_file;
        println!("Writing cleaned data to {}...", cleaned_path.display());
        let json_content = serde_json::to_string_pretty(&cleaned)?;
        fs::write(cleaned_path, json_content)?;

        info!("Cleaned {} records into {}", cleaned.len(), cleaned_path.display());
        println!("Successfully cleaned {} records", cleaned.len());
        println!("Cleaned data saved to '{}'", cleaned_path.display());

        if let Some(first) = cleaned.first() {
            println!("\nSample of first cleaned record:");
            println!("{}", serde_json::to_string_pretty(first)?);
        }

        Ok(CleanResult {
            records: cleaned.len(),
            output_file: cleaned_path.display().to_string(),
        })
    }

    /// Step 2: ensure the schema exists and batch-insert the normalized
    /// records, deduplicating on detail_url. Re-runnable; prints the count
    /// summary and post-import statistics for the operator.
    #[instrument(skip(config))]
    pub fn import(config: &Config) -> Result<ImportReport> {
        let cleaned_path = &config.data.cleaned_file;
        if !cleaned_path.exists() {
            return Err(JobsDbError::MissingInput(format!(
                "{} not found; run the clean step first",
                cleaned_path.display()
            )));
        }

        println!("Reading cleaned JSON data...");
        let content = fs::read_to_string(cleaned_path)?;
        let records: Vec<NormalizedRecord> = serde_json::from_str(&content)?;
        info!("Found {} jobs to import", records.len());
        println!("Found {} jobs to import", records.len());

        let mut store = JobStore::open(&config.data.database_file)?;
        store.init_schema()?;

        let summary = store.import_records(&records, config.import.batch_size)?;
        let overview = store.overview()?;

        println!("\nImport completed!");
        println!("Total records in database: {}", overview.total_jobs);
        println!("New records imported: {}", summary.inserted);
        println!("Duplicate records skipped: {}", summary.skipped);
        if summary.failed > 0 {
            println!("Records rejected by the store: {}", summary.failed);
        }

        println!("\nSample of imported data:");
        for job in store.sample_jobs(IMPORT_SAMPLE_LIMIT)? {
            println!(
                "- {} at {} ({})",
                job.title.as_deref().unwrap_or("(untitled)"),
                job.company_name.as_deref().unwrap_or("(no company)"),
                job.location.as_deref().unwrap_or("(no location)")
            );
        }

        println!("\nDatabase statistics:");
        println!("Unique companies: {}", overview.total_companies);
        println!("Unique locations: {}", overview.total_locations);
        println!("Job states distribution:");
        for state in store.state_distribution()? {
            println!(
                "  {}: {}",
                state.state.as_deref().unwrap_or("(none)"),
                state.count
            );
        }
        println!(
            "\nDatabase saved as '{}' at {}",
            config.data.database_file.display(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        Ok(ImportReport {
            total_records: records.len(),
            summary,
            total_rows: overview.total_jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.data.raw_file = dir.path().join("data.json");
        config.data.cleaned_file = dir.path().join("data_cleaned.json");
        config.data.database_file = dir.path().join("jobs_database.db");
        config
    }

    #[test]
    fn clean_rejects_missing_input() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        let err = Pipeline::clean(&config).unwrap_err();
        assert!(matches!(err, JobsDbError::MissingInput(_)));
    }

    #[test]
    fn clean_rejects_malformed_input() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        fs::write(&config.data.raw_file, "{not json").unwrap();

        let err = Pipeline::clean(&config).unwrap_err();
        assert!(matches!(err, JobsDbError::Json(_)));
    }

    #[test]
    fn clean_preserves_length_and_order() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        let raw = json!([
            {"Title": "First", "Junk": 1},
            {"Title": "Second", "Location": "Berlin"},
            {"Company Name": "Acme"}
        ]);
        fs::write(&config.data.raw_file, raw.to_string()).unwrap();

        let result = Pipeline::clean(&config).unwrap();
        assert_eq!(result.records, 3);

        let cleaned: Vec<NormalizedRecord> =
            serde_json::from_str(&fs::read_to_string(&config.data.cleaned_file).unwrap()).unwrap();
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[0].text("Title").as_deref(), Some("First"));
        assert_eq!(cleaned[0].text("Junk"), None);
        assert_eq!(cleaned[1].text("Location").as_deref(), Some("Berlin"));
        assert_eq!(cleaned[2].text("Company Name").as_deref(), Some("Acme"));
    }

    #[test]
    fn import_requires_the_cleaned_file() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        let err = Pipeline::import(&config).unwrap_err();
        assert!(matches!(err, JobsDbError::MissingInput(_)));
    }

    #[test]
    fn clean_then_import_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        let raw = json!([
            {"Title": "Engineer", "Detail URL": "http://a/1", "Company Name": "Acme"},
            {"Title": "Engineer", "Detail URL": "http://a/1", "Company Name": "Acme"}
        ]);
        fs::write(&config.data.raw_file, raw.to_string()).unwrap();

        Pipeline::clean(&config).unwrap();
        let first = Pipeline::import(&config).unwrap();
        assert_eq!(first.summary.inserted, 1);
        assert_eq!(first.summary.skipped, 1);
        assert_eq!(first.total_rows, 1);

        let second = Pipeline::import(&config).unwrap();
        assert_eq!(second.summary.inserted, 0);
        assert_eq!(second.summary.skipped, 2);
        assert_eq!(second.total_rows, 1);
    }
}
