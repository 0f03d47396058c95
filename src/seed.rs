//! Seed data loading.
//!
//! The seed directory holds `careers.json`, `questions.json`, `roadmaps.json` and
//! `colleges.json`. The colleges file keeps exams and colleges in two lists
//! (`{"exams": [...], "colleges": [...]}`); they are flattened into one collection
//! with a `type` discriminant here.

use crate::catalog::{Career, CollegeExam, EntryKind, Question, Roadmap};
use crate::error::{CatalogError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Everything a store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedData {
    pub careers: Vec<Career>,
    pub questions: Vec<Question>,
    pub roadmaps: Vec<Roadmap>,
    pub entries: Vec<CollegeExam>,
}

#[derive(Debug, Deserialize)]
struct CollegesFile {
    #[serde(default)]
    exams: Vec<serde_json::Value>,
    #[serde(default)]
    colleges: Vec<serde_json::Value>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<T> {
    let path = dir.join(file_name);
    let content = std::fs::read_to_string(&path).map_err(|e| CatalogError::Config {
        message: format!("Failed to read seed file {}: {}", path.display(), e),
    })?;
    serde_json::from_str(&content).map_err(|e| CatalogError::Serialization {
        message: format!("Invalid seed file {}: {}", path.display(), e),
    })
}

fn tag_entries(raw: Vec<serde_json::Value>, kind: EntryKind) -> Result<Vec<CollegeExam>> {
    raw.into_iter()
        .map(|mut value| {
            if let Some(obj) = value.as_object_mut() {
                obj.insert("type".to_string(), serde_json::json!(kind.as_str()));
            }
            serde_json::from_value(value).map_err(CatalogError::from)
        })
        .collect()
}

impl SeedData {
    /// Load and validate all four seed files from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let colleges: CollegesFile = read_json(dir, "colleges.json")?;
        let mut entries = tag_entries(colleges.exams, EntryKind::Exam)?;
        entries.extend(tag_entries(colleges.colleges, EntryKind::College)?);

        let seed = Self {
            careers: read_json(dir, "careers.json")?,
            questions: read_json(dir, "questions.json")?,
            roadmaps: read_json(dir, "roadmaps.json")?,
            entries,
        };
        seed.validate()?;

        info!(
            "Loaded seed data from {}: {} careers, {} questions, {} roadmaps, {} colleges/exams",
            dir.display(),
            seed.careers.len(),
            seed.questions.len(),
            seed.roadmaps.len(),
            seed.entries.len()
        );
        Ok(seed)
    }

    /// Domain ids must be unique within each collection
    pub fn validate(&self) -> Result<()> {
        fn unique<K: std::fmt::Display>(
            collection: &str,
            ids: impl Iterator<Item = K>,
        ) -> Result<()> {
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id.to_string()) {
                    return Err(CatalogError::validation(format!(
                        "duplicate id {} in {}",
                        id, collection
                    )));
                }
            }
            Ok(())
        }

        unique("careers", self.careers.iter().map(|c| c.id))?;
        unique("questions", self.questions.iter().map(|q| q.id))?;
        unique("roadmaps", self.roadmaps.iter().map(|r| r.id.as_str()))?;
        unique("colleges", self.entries.iter().map(|e| e.id))?;
        Ok(())
    }
}
