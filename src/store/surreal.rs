//! SurrealDB-backed catalog store.
//!
//! Records are keyed by their domain id (`careers:7`, `roadmaps:⟨web-dev⟩`), and every
//! projection returns `meta::id(id) AS id` so callers never see record ids.

use crate::catalog::{Career, CollegeExam, Question, Roadmap};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::seed::SeedData;
use crate::store::{CareerFilter, CatalogStore, EntryFilter, PageWindow};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use tracing::{info, warn};

pub const CAREERS: &str = "careers";
pub const QUESTIONS: &str = "questions";
pub const ROADMAPS: &str = "roadmaps";
pub const ENTRIES: &str = "college_exams";

const CAREER_LIST_FIELDS: &str = "meta::id(id) AS id, title, `type`, description, salary, education, stream, subjects, skills";
const ENTRY_FIELDS: &str =
    "meta::id(id) AS id, name, `type`, stream, description, date, location, exam, rating";

const SCHEMA_SQL: &str = r#"
    DEFINE TABLE IF NOT EXISTS careers SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_careers_title ON TABLE careers FIELDS title;
    DEFINE INDEX IF NOT EXISTS idx_careers_type ON TABLE careers FIELDS `type`;

    DEFINE TABLE IF NOT EXISTS questions SCHEMALESS;

    DEFINE TABLE IF NOT EXISTS roadmaps SCHEMALESS;

    DEFINE TABLE IF NOT EXISTS college_exams SCHEMALESS;
    DEFINE FIELD IF NOT EXISTS `type` ON TABLE college_exams TYPE string ASSERT $value IN ["Exam", "College"];
    DEFINE INDEX IF NOT EXISTS idx_entries_name ON TABLE college_exams FIELDS name;
    DEFINE INDEX IF NOT EXISTS idx_entries_type ON TABLE college_exams FIELDS `type`;
    DEFINE INDEX IF NOT EXISTS idx_entries_stream ON TABLE college_exams FIELDS stream;
"#;

/// Normalize URL for SurrealDB Ws engine (expects host:port, no scheme)
pub fn normalize_ws_url(s: &str) -> String {
    s.strip_prefix("ws://")
        .or_else(|| s.strip_prefix("wss://"))
        .or_else(|| s.strip_prefix("http://"))
        .or_else(|| s.strip_prefix("https://"))
        .unwrap_or(s)
        .trim_end_matches('/')
        .to_string()
}

/// Backoff between connection attempts: 1s, 2s, 4s ... capped at 60s
pub fn reconnect_delay(attempt: u32) -> Duration {
    Duration::from_millis((1000 * (1u64 << attempt.min(6))).min(60_000))
}

#[derive(Clone)]
pub struct SurrealStore {
    db: Arc<Surreal<Client>>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

impl SurrealStore {
    /// Connect once, failing fast. Used by the seeder and tooling.
    pub async fn connect(config: &Config) -> Result<Self> {
        let store = Self {
            db: Arc::new(Surreal::init()),
        };
        store.open_transport(config).await?;
        store.select_database(config).await?;
        Ok(store)
    }

    /// Return immediately with an unconnected handle and keep connecting in the background.
    ///
    /// Queries issued before the connection is established fail with a database error;
    /// the process keeps serving.
    pub fn connect_in_background(config: &Config) -> Self {
        let store = Self {
            db: Arc::new(Surreal::init()),
        };
        let task_store = store.clone();
        let config = config.clone();
        tokio::spawn(async move {
            // The transport can only be opened once per handle, so the two phases retry separately
            let mut attempt: u32 = 0;
            while let Err(e) = task_store.open_transport(&config).await {
                task_store.backoff("connection", attempt, &e).await;
                attempt = attempt.saturating_add(1);
            }
            while let Err(e) = task_store.select_database(&config).await {
                task_store.backoff("sign-in", attempt, &e).await;
                attempt = attempt.saturating_add(1);
            }
            info!(
                "Connected to SurrealDB at {} after {} attempt(s)",
                config.database.url,
                attempt + 1
            );
        });
        store
    }

    async fn backoff(&self, phase: &str, attempt: u32, err: &CatalogError) {
        let delay = reconnect_delay(attempt);
        warn!(
            "SurrealDB {} attempt {} failed: {}. Retrying in {}ms...",
            phase,
            attempt + 1,
            err,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }

    async fn open_transport(&self, config: &Config) -> Result<()> {
        let url = normalize_ws_url(&config.database.url);
        info!("Connecting to SurrealDB service via WebSocket at {}", url);
        self.db.connect::<Ws>(url).await?;
        Ok(())
    }

    async fn select_database(&self, config: &Config) -> Result<()> {
        self.db
            .signin(surrealdb::opt::auth::Root {
                username: &config.runtime.database_user,
                password: &config.runtime.database_pass,
            })
            .await
            .map_err(|e| {
                CatalogError::database(format!(
                    "Failed to authenticate with SurrealDB as user '{}': {}",
                    config.runtime.database_user, e
                ))
            })?;

        self.db
            .use_ns(&config.database.namespace)
            .use_db(&config.database.database)
            .await?;

        self.initialize_schema().await
    }

    /// Define tables and the title/type/name/stream indexes
    pub async fn initialize_schema(&self) -> Result<()> {
        self.db
            .query(SCHEMA_SQL)
            .await
            .and_then(|r| r.check())
            .map_err(|e| CatalogError::database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        sql: String,
        binds: Vec<(&'static str, String)>,
    ) -> Result<Vec<T>> {
        let mut query = self.db.query(sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows: Vec<serde_json::Value> = query.await?.take(0)?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(CatalogError::from))
            .collect()
    }

    async fn count_rows(&self, sql: String, binds: Vec<(&'static str, String)>) -> Result<u64> {
        let rows: Vec<CountRow> = self.fetch_rows(sql, binds).await?;
        // GROUP ALL over zero matches yields no row at all
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

/// WHERE clause and bind values for a careers filter
fn career_predicate(filter: &CareerFilter) -> (String, Vec<(&'static str, String)>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    if let Some(search) = &filter.search {
        clauses.push(
            "(string::contains(string::lowercase(title), $search) \
             OR string::contains(string::lowercase(description), $search))",
        );
        binds.push(("search", search.needle().to_string()));
    }
    if let Some(kind) = filter.kind {
        clauses.push("`type` = $kind");
        binds.push(("kind", kind.code().to_string()));
    }
    (where_clause(&clauses), binds)
}

/// WHERE clause and bind values for a college/exam filter
fn entry_predicate(filter: &EntryFilter) -> (String, Vec<(&'static str, String)>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    if let Some(kind) = filter.kind {
        clauses.push("`type` = $kind");
        binds.push(("kind", kind.as_str().to_string()));
    }
    if let Some(search) = &filter.search {
        clauses.push(
            "(string::contains(string::lowercase(name), $search) \
             OR string::contains(string::lowercase(stream), $search))",
        );
        binds.push(("search", search.needle().to_string()));
    }
    (where_clause(&clauses), binds)
}

fn where_clause(clauses: &[&str]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn window_sql(window: PageWindow) -> String {
    format!(" LIMIT {} START {}", window.limit, window.skip)
}

/// Split a serialized record into its domain id and the remaining content
fn into_content(mut value: serde_json::Value) -> Result<(serde_json::Value, serde_json::Value)> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| CatalogError::Internal {
            message: "seed record is not an object".into(),
        })?;
    let id = obj.remove("id").ok_or_else(|| CatalogError::Internal {
        message: "seed record has no id".into(),
    })?;
    Ok((id, value))
}

#[async_trait]
impl CatalogStore for SurrealStore {
    fn backend_tag(&self) -> &'static str {
        "surreal"
    }

    async fn count_careers(&self, filter: &CareerFilter) -> Result<u64> {
        let (predicate, binds) = career_predicate(filter);
        let sql = format!("SELECT count() AS total FROM {CAREERS}{predicate} GROUP ALL");
        self.count_rows(sql, binds).await
    }

    async fn find_careers(
        &self,
        filter: &CareerFilter,
        window: PageWindow,
    ) -> Result<Vec<Career>> {
        let (predicate, binds) = career_predicate(filter);
        let sql = format!(
            "SELECT {CAREER_LIST_FIELDS} FROM {CAREERS}{predicate}{}",
            window_sql(window)
        );
        self.fetch_rows(sql, binds).await
    }

    async fn career_by_id(&self, id: i64) -> Result<Option<Career>> {
        let sql = format!(
            "SELECT {CAREER_LIST_FIELDS}, subCareers FROM type::thing('{CAREERS}', $id)"
        );
        let rows: Vec<serde_json::Value> =
            self.db.query(sql).bind(("id", id)).await?.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(CatalogError::from))
            .transpose()
    }

    async fn questions(&self) -> Result<Vec<Question>> {
        let sql = format!("SELECT meta::id(id) AS id, question, `type` FROM {QUESTIONS}");
        self.fetch_rows(sql, Vec::new()).await
    }

    async fn roadmaps(&self) -> Result<Vec<Roadmap>> {
        let sql =
            format!("SELECT meta::id(id) AS id, title, description, steps FROM {ROADMAPS}");
        self.fetch_rows(sql, Vec::new()).await
    }

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64> {
        let (predicate, binds) = entry_predicate(filter);
        let sql = format!("SELECT count() AS total FROM {ENTRIES}{predicate} GROUP ALL");
        self.count_rows(sql, binds).await
    }

    async fn find_entries(
        &self,
        filter: &EntryFilter,
        window: PageWindow,
    ) -> Result<Vec<CollegeExam>> {
        let (predicate, binds) = entry_predicate(filter);
        let sql = format!(
            "SELECT {ENTRY_FIELDS} FROM {ENTRIES}{predicate}{}",
            window_sql(window)
        );
        self.fetch_rows(sql, binds).await
    }

    async fn replace_all(&self, seed: SeedData) -> Result<()> {
        self.db
            .query(format!(
                "DELETE {CAREERS}; DELETE {QUESTIONS}; DELETE {ROADMAPS}; DELETE {ENTRIES};"
            ))
            .await
            .and_then(|r| r.check())?;

        let mut records: Vec<(&'static str, serde_json::Value)> = Vec::new();
        for career in &seed.careers {
            records.push((CAREERS, serde_json::to_value(career)?));
        }
        for question in &seed.questions {
            records.push((QUESTIONS, serde_json::to_value(question)?));
        }
        for roadmap in &seed.roadmaps {
            records.push((ROADMAPS, serde_json::to_value(roadmap)?));
        }
        for entry in &seed.entries {
            records.push((ENTRIES, serde_json::to_value(entry)?));
        }

        let total = records.len();
        for (table, value) in records {
            let (id, content) = into_content(value)?;
            self.db
                .query("CREATE type::thing($tb, $id) CONTENT $data RETURN NONE")
                .bind(("tb", table))
                .bind(("id", id))
                .bind(("data", content))
                .await
                .and_then(|r| r.check())?;
        }
        info!("Seeded {} records into SurrealDB", total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntryKind, RiasecType};
    use crate::store::SearchText;

    #[test]
    fn test_normalize_ws_url() {
        assert_eq!(normalize_ws_url("ws://127.0.0.1:8000"), "127.0.0.1:8000");
        assert_eq!(normalize_ws_url("https://db.example.com/"), "db.example.com");
        assert_eq!(normalize_ws_url("127.0.0.1:8000"), "127.0.0.1:8000");
    }

    #[test]
    fn test_reconnect_delay_doubles_then_caps() {
        assert_eq!(reconnect_delay(0), Duration::from_secs(1));
        assert_eq!(reconnect_delay(1), Duration::from_secs(2));
        assert_eq!(reconnect_delay(2), Duration::from_secs(4));
        assert_eq!(reconnect_delay(30), Duration::from_secs(60));
    }

    #[test]
    fn test_career_predicate_combines_search_and_type() {
        let (sql, binds) = career_predicate(&CareerFilter {
            search: SearchText::new("Data"),
            kind: Some(RiasecType::Investigative),
        });
        assert!(sql.starts_with(" WHERE ("));
        assert!(sql.contains("string::lowercase(title)"));
        assert!(sql.contains("OR string::contains(string::lowercase(description)"));
        assert!(sql.contains(" AND `type` = $kind"));
        assert_eq!(
            binds,
            vec![("search", "data".to_string()), ("kind", "I".to_string())]
        );
    }

    #[test]
    fn test_entry_predicate_without_filters_is_empty() {
        let (sql, binds) = entry_predicate(&EntryFilter::default());
        assert!(sql.is_empty());
        assert!(binds.is_empty());

        let (sql, _) = entry_predicate(&EntryFilter {
            search: None,
            kind: Some(EntryKind::Exam),
        });
        assert_eq!(sql, " WHERE `type` = $kind");
    }

    #[test]
    fn test_window_sql() {
        assert_eq!(
            window_sql(PageWindow { skip: 18, limit: 9 }),
            " LIMIT 9 START 18"
        );
    }

    #[test]
    fn test_into_content_strips_id() {
        let (id, content) =
            into_content(serde_json::json!({"id": 4, "question": "q", "type": "A"})).unwrap();
        assert_eq!(id, serde_json::json!(4));
        assert!(content.get("id").is_none());
        assert_eq!(content["type"], "A");
    }
}
