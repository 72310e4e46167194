//! Flat-file export of the jobs table and the per-company rollup.

use crate::db::JobStore;
use crate::error::Result;
use crate::types::{JobRow, FIELDS};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const JOBS_EXPORT_FILE: &str = "jobs_export.csv";
pub const COMPANY_SUMMARY_FILE: &str = "company_summary.csv";

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row with RFC-style quoting.
fn write_row<W: Write>(w: &mut W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn job_cells(job: &JobRow) -> Vec<String> {
    vec![
        job.id.to_string(),
        opt(&job.title),
        opt(&job.description),
        opt(&job.primary_description),
        opt(&job.detail_url),
        opt(&job.location),
        opt(&job.skill),
        opt(&job.insight),
        opt(&job.job_state),
        opt(&job.poster_id),
        opt(&job.company_name),
        opt(&job.company_logo),
        opt(&job.created_at),
        opt(&job.scraped_at),
        job.imported_at.clone(),
    ]
}

/// Dump the entire table. Returns the number of exported rows.
pub fn export_jobs<P: AsRef<Path>>(store: &JobStore, path: P) -> Result<usize> {
    let jobs = store.all_jobs()?;
    let mut w = BufWriter::new(File::create(&path)?);

    let mut header: Vec<String> = vec!["id".to_string()];
    header.extend(FIELDS.iter().map(|f| f.column.to_string()));
    header.push("imported_at".to_string());
    write_row(&mut w, &header)?;

    for job in &jobs {
        write_row(&mut w, &job_cells(job))?;
    }
    w.flush()?;

    info!("Exported {} rows to {}", jobs.len(), path.as_ref().display());
    Ok(jobs.len())
}

/// Dump the per-company summary. Returns the number of exported companies.
pub fn export_company_summary<P: AsRef<Path>>(store: &JobStore, path: P) -> Result<usize> {
    let companies = store.company_export()?;
    let mut w = BufWriter::new(File::create(&path)?);

    write_row(
        &mut w,
        &[
            "company_name".to_string(),
            "total_jobs".to_string(),
            "locations_count".to_string(),
            "first_job_date".to_string(),
            "latest_job_date".to_string(),
        ],
    )?;

    for company in &companies {
        write_row(
            &mut w,
            &[
                company.company_name.clone(),
                company.total_jobs.to_string(),
                company.locations_count.to_string(),
                opt(&company.first_job_date),
                opt(&company.latest_job_date),
            ],
        )?;
    }
    w.flush()?;

    info!(
        "Exported {} company summaries to {}",
        companies.len(),
        path.as_ref().display()
    );
    Ok(companies.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NormalizedRecord, RawRecord};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn record(value: serde_json::Value) -> NormalizedRecord {
        let raw: RawRecord = value.as_object().unwrap().clone();
        NormalizedRecord::project(&raw)
    }

    #[test]
    fn quoting_escapes_commas_quotes_and_newlines() {
        let mut out = Vec::new();
        write_row(
            &mut out,
            &[
                "plain".to_string(),
                "has,comma".to_string(),
                "has \"quote\"".to_string(),
                "has\nnewline".to_string(),
            ],
        )
        .unwrap();

        let line = String::from_utf8(out).unwrap();
        assert_eq!(
            line,
            "plain,\"has,comma\",\"has \"\"quote\"\"\",\"has\nnewline\"\n"
        );
    }

    #[test]
    fn exports_write_headers_and_all_rows() {
        let dir = tempdir().unwrap();
        let mut store = JobStore::open(dir.path().join("jobs.db")).unwrap();
        store.init_schema().unwrap();
        store
            .import_records(
                &[
                    record(json!({"Title": "Engineer, Senior", "Company Name": "Acme",
                                  "Location": "Berlin", "Created At": "2024-01-01",
                                  "Detail URL": "http://a/1"})),
                    record(json!({"Title": "Analyst", "Company Name": "Acme",
                                  "Location": "Munich", "Created At": "2024-02-01",
                                  "Detail URL": "http://a/2"})),
                ],
                1000,
            )
            .unwrap();

        let jobs_path = dir.path().join(JOBS_EXPORT_FILE);
        let exported = export_jobs(&store, &jobs_path).unwrap();
        assert_eq!(exported, 2);

        let content = fs::read_to_string(&jobs_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title,description"));
        assert!(lines[1].contains("\"Engineer, Senior\""));

        let summary_path = dir.path().join(COMPANY_SUMMARY_FILE);
        let companies = export_company_summary(&store, &summary_path).unwrap();
        assert_eq!(companies, 1);

        let content = fs::read_to_string(&summary_path).unwrap();
        assert!(content.contains("Acme,2,2,2024-01-01,2024-02-01"));
    }
}
