//! Read-only query surface over the jobs store, shared by the HTTP API and
//! the console report. Every operation is independent and stateless.

use crate::constants::COMPANY_JOBS_LIMIT;
use crate::db::JobStore;
use crate::error::Result;
use crate::types::JobRow;
use rusqlite::params;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub total_jobs: i64,
    pub total_companies: i64,
    pub total_locations: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateCount {
    pub state: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyJob {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanySummary {
    pub company_name: String,
    pub job_count: i64,
    pub locations: i64,
    pub latest_job: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub location: String,
    pub job_count: i64,
    pub companies: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyExportRow {
    pub company_name: String,
    pub total_jobs: i64,
    pub locations_count: i64,
    pub first_job_date: Option<String>,
    pub latest_job_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentJob {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub created_at: Option<String>,
}

/// Cut description text for a result view. The stored value never changes;
/// this only shapes what a listing shows.
pub fn truncate_for_display(text: &str, cutoff: usize) -> String {
    if text.chars().count() > cutoff {
        let cut: String = text.chars().take(cutoff).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

impl JobStore {
    pub fn overview(&self) -> Result<Overview> {
        let total_jobs =
            self.conn
                .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        let total_companies = self.conn.query_row(
            "SELECT COUNT(DISTINCT company_name) FROM jobs WHERE company_name IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        let total_locations = self.conn.query_row(
            "SELECT COUNT(DISTINCT location) FROM jobs WHERE location IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(Overview {
            total_jobs,
            total_companies,
            total_locations,
        })
    }

    pub fn top_companies(&self, limit: usize) -> Result<Vec<GroupCount>> {
        self.group_counts("company_name", limit)
    }

    pub fn top_locations(&self, limit: usize) -> Result<Vec<GroupCount>> {
        self.group_counts("location", limit)
    }

    fn group_counts(&self, column: &str, limit: usize) -> Result<Vec<GroupCount>> {
        let sql = format!(
            "SELECT {column}, COUNT(*) as job_count
             FROM jobs
             WHERE {column} IS NOT NULL AND {column} != ''
             GROUP BY {column}
             ORDER BY job_count DESC
             LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(GroupCount {
                name: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn state_distribution(&self) -> Result<Vec<StateCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_state, COUNT(*) as count
             FROM jobs
             GROUP BY job_state
             ORDER BY count DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StateCount {
                state: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Substring search over title, description, and company name, ranked
    /// title > company > description-only. Ties resolve newest first, then
    /// insertion order, so the ordering is a stable total order.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            "SELECT title, company_name, location, description, detail_url
             FROM jobs
             WHERE (title LIKE ?1 OR description LIKE ?1 OR company_name LIKE ?1)
               AND title IS NOT NULL
             ORDER BY
                 CASE WHEN title LIKE ?1 THEN 1
                      WHEN company_name LIKE ?1 THEN 2
                      ELSE 3 END,
                 created_at DESC,
                 id
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            Ok(SearchHit {
                title: row.get(0)?,
                company: row.get(1)?,
                location: row.get(2)?,
                description: row.get(3)?,
                url: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Exact-match company listing, newest first, capped at 20.
    pub fn company_jobs(&self, company_name: &str) -> Result<Vec<CompanyJob>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, location, description, detail_url, created_at
             FROM jobs
             WHERE company_name = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![company_name, COMPANY_JOBS_LIMIT as i64], |row| {
            Ok(CompanyJob {
                title: row.get(0)?,
                location: row.get(1)?,
                description: row.get(2)?,
                url: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn company_summaries(&self, limit: usize) -> Result<Vec<CompanySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT company_name, COUNT(*) as job_count,
                    COUNT(DISTINCT location) as locations,
                    MAX(created_at) as latest_job
             FROM jobs
             WHERE company_name IS NOT NULL AND company_name != ''
             GROUP BY company_name
             ORDER BY job_count DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(CompanySummary {
                company_name: row.get(0)?,
                job_count: row.get(1)?,
                locations: row.get(2)?,
                latest_job: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn location_summaries(&self, limit: usize) -> Result<Vec<LocationSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT location, COUNT(*) as job_count,
                    COUNT(DISTINCT company_name) as companies
             FROM jobs
             WHERE location IS NOT NULL AND location != ''
             GROUP BY location
             ORDER BY job_count DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(LocationSummary {
                location: row.get(0)?,
                job_count: row.get(1)?,
                companies: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn recent_jobs(&self, limit: usize) -> Result<Vec<RecentJob>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, company_name, location, created_at
             FROM jobs
             WHERE created_at IS NOT NULL
             ORDER BY created_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RecentJob {
                title: row.get(0)?,
                company_name: row.get(1)?,
                location: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// First rows in insertion order, for the post-import sample.
    pub fn sample_jobs(&self, limit: usize) -> Result<Vec<RecentJob>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, company_name, location, created_at FROM jobs LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RecentJob {
                title: row.get(0)?,
                company_name: row.get(1)?,
                location: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Full-table dump for the bulk export.
    pub fn all_jobs(&self) -> Result<Vec<JobRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, primary_description, detail_url,
                    location, skill, insight, job_state, poster_id,
                    company_name, company_logo, created_at, scraped_at, imported_at
             FROM jobs
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(JobRow {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                primary_description: row.get(3)?,
                detail_url: row.get(4)?,
                location: row.get(5)?,
                skill: row.get(6)?,
                insight: row.get(7)?,
                job_state: row.get(8)?,
                poster_id: row.get(9)?,
                company_name: row.get(10)?,
                company_logo: row.get(11)?,
                created_at: row.get(12)?,
                scraped_at: row.get(13)?,
                imported_at: row.get(14)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Per-company rollup for the bulk export: job count, distinct
    /// locations, first and latest creation timestamps.
    pub fn company_export(&self) -> Result<Vec<CompanyExportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT company_name, COUNT(*) as total_jobs,
                    COUNT(DISTINCT location) as locations_count,
                    MIN(created_at) as first_job_date,
                    MAX(created_at) as latest_job_date
             FROM jobs
             WHERE company_name IS NOT NULL
             GROUP BY company_name
             ORDER BY total_jobs DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CompanyExportRow {
                company_name: row.get(0)?,
                total_jobs: row.get(1)?,
                locations_count: row.get(2)?,
                first_job_date: row.get(3)?,
                latest_job_date: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
