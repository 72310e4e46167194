//! Named limits shared by the importer and the query front ends.

/// Records per bulk insert in the importer. Batching is a throughput and
/// progress-reporting concern only; batch boundaries carry no semantics.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default result cap for `/api/search` when the caller passes no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Display cutoffs for description text. The stored value is never touched.
pub const SEARCH_DESCRIPTION_CUTOFF: usize = 200;
pub const COMPANY_DESCRIPTION_CUTOFF: usize = 150;

/// Top-N sizes per consumer.
pub const DASHBOARD_TOP_N: usize = 5;
pub const REPORT_TOP_N: usize = 10;
pub const LISTING_LIMIT: usize = 50;

/// Per-company job listing cap.
pub const COMPANY_JOBS_LIMIT: usize = 20;

/// Rows shown in the "recent jobs" report section and the import sample.
pub const RECENT_JOBS_LIMIT: usize = 5;
pub const IMPORT_SAMPLE_LIMIT: usize = 5;

/// Hits printed by the console report's interactive search.
pub const REPORT_SEARCH_LIMIT: usize = 10;
