use crate::error::Result;
use crate::types::{NormalizedRecord, FIELDS};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts reported by an import run. Duplicates are skipped, never fatal;
/// `failed` records were rejected by the store for some other reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Scoped connection to the jobs store. Opened per operation and dropped on
/// completion; the importer is the only writer.
pub struct JobStore {
    pub(crate) conn: Connection,
}

fn insert_sql(or_ignore: bool) -> String {
    let columns: Vec<&str> = FIELDS.iter().map(|f| f.column).collect();
    let placeholders = vec!["?"; FIELDS.len()].join(", ");
    format!(
        "INSERT {}INTO jobs ({}) VALUES ({})",
        if or_ignore { "OR IGNORE " } else { "" },
        columns.join(", "),
        placeholders
    )
}

impl JobStore {
    /// Open the database file, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Idempotent schema creation: the `jobs` table plus the indexes backing
    /// the read patterns. Safe to run before every import.
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                description TEXT,
                primary_description TEXT,
                detail_url TEXT UNIQUE,
                location TEXT,
                skill TEXT,
                insight TEXT,
                job_state TEXT,
                poster_id TEXT,
                company_name TEXT,
                company_logo TEXT,
                created_at TEXT,
                scraped_at TEXT,
                imported_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_company_name ON jobs(company_name);
            CREATE INDEX IF NOT EXISTS idx_location ON jobs(location);
            CREATE INDEX IF NOT EXISTS idx_job_state ON jobs(job_state);
            CREATE INDEX IF NOT EXISTS idx_created_at ON jobs(created_at);
            CREATE INDEX IF NOT EXISTS idx_detail_url ON jobs(detail_url);
            "#,
        )?;
        Ok(())
    }

    /// Bind values in `FIELDS` order. The dedup key goes through
    /// `detail_url()` so empty URLs land as NULL and never collide.
    fn bind_values(record: &NormalizedRecord) -> Vec<Option<String>> {
        FIELDS
            .iter()
            .map(|field| {
                if field.column == "detail_url" {
                    record.detail_url()
                } else {
                    record.text(field.source_key)
                }
            })
            .collect()
    }

    /// Bulk path: the whole batch as plain INSERTs in one transaction.
    /// Any failure rolls the batch back and surfaces to the caller.
    fn insert_batch(&mut self, batch: &[NormalizedRecord]) -> rusqlite::Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&insert_sql(false))?;
            for record in batch {
                stmt.execute(params_from_iter(Self::bind_values(record)))?;
            }
        }
        tx.commit()?;
        Ok(batch.len())
    }

    /// Replay path: one record at a time with INSERT OR IGNORE. A no-op
    /// insert is a skipped duplicate; any other rejection is logged with
    /// its position and counted, and the rest of the batch continues.
    fn replay_batch(
        &mut self,
        batch: &[NormalizedRecord],
        batch_number: usize,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&insert_sql(true))?;
        for (index, record) in batch.iter().enumerate() {
            match stmt.execute(params_from_iter(Self::bind_values(record))) {
                Ok(0) => {
                    summary.skipped += 1;
                    debug!(
                        "Skipped duplicate detail_url {:?} (batch {}, record {})",
                        record.detail_url(),
                        batch_number,
                        index
                    );
                }
                Ok(_) => summary.inserted += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        "Record {} in batch {} rejected by store: {}",
                        index, batch_number, e
                    );
                }
            }
        }
        Ok(())
    }

    /// Two-tier import: try each batch wholesale, and when a batch fails
    /// (typically a uniqueness violation) replay that batch record by
    /// record so one bad record never blocks the rest.
    pub fn import_records(
        &mut self,
        records: &[NormalizedRecord],
        batch_size: usize,
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for (batch_index, batch) in records.chunks(batch_size.max(1)).enumerate() {
            let batch_number = batch_index + 1;
            match self.insert_batch(batch) {
                Ok(count) => {
                    summary.inserted += count;
                    info!("Imported batch {}: {} records", batch_number, count);
                }
                Err(e) => {
                    info!("Batch {} failed ({}); replaying record by record", batch_number, e);
                    self.replay_batch(batch, batch_number, &mut summary)?;
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawRecord;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: serde_json::Value) -> NormalizedRecord {
        let raw: RawRecord = value.as_object().unwrap().clone();
        NormalizedRecord::project(&raw)
    }

    fn open_store(dir: &tempfile::TempDir) -> JobStore {
        let store = JobStore::open(dir.path().join("jobs.db")).unwrap();
        store.init_schema().unwrap();
        store
    }

    fn total_rows(store: &JobStore) -> i64 {
        store
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn duplicate_urls_within_a_batch_collapse_to_one_row() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);

        let records = vec![
            record(json!({"Title": "Engineer", "Detail URL": "http://a/1", "Company Name": "Acme"})),
            record(json!({"Title": "Engineer", "Detail URL": "http://a/1", "Company Name": "Acme"})),
        ];

        let summary = store.import_records(&records, 1000).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);

        let url_rows: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM jobs WHERE detail_url = 'http://a/1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(url_rows, 1);
    }

    #[test]
    fn reimport_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);

        let records = vec![
            record(json!({"Title": "A", "Detail URL": "http://a/1"})),
            record(json!({"Title": "B", "Detail URL": "http://a/2"})),
        ];

        let first = store.import_records(&records, 1000).unwrap();
        assert_eq!(first.inserted, 2);

        let second = store.import_records(&records, 1000).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(total_rows(&store), 2);
    }

    #[test]
    fn null_and_empty_urls_are_never_deduplicated() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);

        let records = vec![
            record(json!({"Title": "A"})),
            record(json!({"Title": "B"})),
            record(json!({"Title": "C", "Detail URL": ""})),
            record(json!({"Title": "D", "Detail URL": ""})),
        ];

        let summary = store.import_records(&records, 1000).unwrap();
        assert_eq!(summary.inserted, 4);
        assert_eq!(summary.skipped, 0);
        assert_eq!(total_rows(&store), 4);
    }

    #[test]
    fn one_duplicate_does_not_block_the_rest_of_its_batch() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);

        store
            .import_records(
                &[record(json!({"Title": "Old", "Detail URL": "http://a/1"}))],
                1000,
            )
            .unwrap();

        let records = vec![
            record(json!({"Title": "Dup", "Detail URL": "http://a/1"})),
            record(json!({"Title": "New", "Detail URL": "http://a/2"})),
            record(json!({"Title": "Newer", "Detail URL": "http://a/3"})),
        ];

        let summary = store.import_records(&records, 1000).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(total_rows(&store), 3);
    }

    #[test]
    fn batch_boundaries_have_no_correctness_effect() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);

        let records: Vec<NormalizedRecord> = (0..7)
            .map(|i| record(json!({"Title": format!("Job {i}"), "Detail URL": format!("http://a/{i}")})))
            .collect();

        let summary = store.import_records(&records, 2).unwrap();
        assert_eq!(summary.inserted, 7);
        assert_eq!(total_rows(&store), 7);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.init_schema().unwrap();
        assert_eq!(total_rows(&store), 0);
    }
}
