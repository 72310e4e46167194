use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw job posting as scraped; schema not guaranteed.
pub type RawRecord = Map<String, Value>;

/// One column of the `jobs` table together with the source key it is
/// scraped from.
pub struct Field {
    pub column: &'static str,
    pub source_key: &'static str,
}

/// The fixed allow-list. Order matches the `jobs` table column order and
/// drives both the projection and the importer's bind loop.
pub const FIELDS: [Field; 13] = [
    Field { column: "title", source_key: "Title" },
    Field { column: "description", source_key: "Description" },
    Field { column: "primary_description", source_key: "Primary Description" },
    Field { column: "detail_url", source_key: "Detail URL" },
    Field { column: "location", source_key: "Location" },
    Field { column: "skill", source_key: "Skill" },
    Field { column: "insight", source_key: "Insight" },
    Field { column: "job_state", source_key: "Job State" },
    Field { column: "poster_id", source_key: "Poster Id" },
    Field { column: "company_name", source_key: "Company Name" },
    Field { column: "company_logo", source_key: "Company Logo" },
    Field { column: "created_at", source_key: "Created At" },
    Field { column: "scraped_at", source_key: "Scraped At" },
];

/// A job posting reduced to the allow-listed field set. Keys absent from
/// the source stay absent here and read as null everywhere downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord(pub Map<String, Value>);

impl NormalizedRecord {
    /// Project a raw record onto the allow-list, dropping unknown keys.
    /// Values are carried through untouched; no type validation happens here.
    pub fn project(raw: &RawRecord) -> Self {
        let mut out = Map::new();
        for field in &FIELDS {
            if let Some(value) = raw.get(field.source_key) {
                out.insert(field.source_key.to_string(), value.clone());
            }
        }
        Self(out)
    }

    /// Field value as text for storage binding. Non-string scalars keep
    /// their JSON rendering; null and absent both come back as `None`.
    pub fn text(&self, source_key: &str) -> Option<String> {
        match self.0.get(source_key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// The dedup key. Empty and whitespace-only URLs are treated as absent
    /// so such postings never collide with each other in the unique index.
    pub fn detail_url(&self) -> Option<String> {
        self.text("Detail URL").filter(|url| !url.trim().is_empty())
    }
}

/// A persisted posting: the normalized fields plus the surrogate id and
/// import timestamp assigned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub primary_description: Option<String>,
    pub detail_url: Option<String>,
    pub location: Option<String>,
    pub skill: Option<String>,
    pub insight: Option<String>,
    pub job_state: Option<String>,
    pub poster_id: Option<String>,
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub created_at: Option<String>,
    pub scraped_at: Option<String>,
    pub imported_at: String,
}
