use crate::catalog::{Career, CollegeExam, Question, Roadmap};
use crate::error::Result;
use crate::seed::SeedData;
use crate::store::{CareerFilter, CatalogStore, EntryFilter, PageWindow};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process catalog, insertion ordered
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<SeedData>,
}

impl MemoryStore {
    pub fn new(seed: SeedData) -> Self {
        Self {
            data: RwLock::new(seed),
        }
    }
}

fn window_of<T: Clone>(matching: impl Iterator<Item = T>, window: PageWindow) -> Vec<T> {
    let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
    matching.skip(skip).take(limit).collect()
}

#[async_trait]
impl CatalogStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn count_careers(&self, filter: &CareerFilter) -> Result<u64> {
        let data = self.data.read().await;
        Ok(data.careers.iter().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn find_careers(
        &self,
        filter: &CareerFilter,
        window: PageWindow,
    ) -> Result<Vec<Career>> {
        let data = self.data.read().await;
        let matching = data
            .careers
            .iter()
            .filter(|c| filter.matches(c))
            .map(Career::summary);
        Ok(window_of(matching, window))
    }

    async fn career_by_id(&self, id: i64) -> Result<Option<Career>> {
        let data = self.data.read().await;
        Ok(data.careers.iter().find(|c| c.id == id).cloned())
    }

    async fn questions(&self) -> Result<Vec<Question>> {
        Ok(self.data.read().await.questions.clone())
    }

    async fn roadmaps(&self) -> Result<Vec<Roadmap>> {
        Ok(self.data.read().await.roadmaps.clone())
    }

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64> {
        let data = self.data.read().await;
        Ok(data.entries.iter().filter(|e| filter.matches(e)).count() as u64)
    }

    async fn find_entries(
        &self,
        filter: &EntryFilter,
        window: PageWindow,
    ) -> Result<Vec<CollegeExam>> {
        let data = self.data.read().await;
        let matching = data.entries.iter().filter(|e| filter.matches(e)).cloned();
        Ok(window_of(matching, window))
    }

    async fn replace_all(&self, seed: SeedData) -> Result<()> {
        *self.data.write().await = seed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntryDetails, EntryKind, RiasecType};
    use crate::store::SearchText;

    fn entry(id: i64, name: &str, stream: &str, kind: EntryKind) -> CollegeExam {
        let details = match kind {
            EntryKind::Exam => EntryDetails::Exam { date: None },
            EntryKind::College => EntryDetails::College {
                location: None,
                exam: None,
                rating: None,
            },
        };
        CollegeExam {
            id,
            name: name.into(),
            stream: stream.into(),
            description: String::new(),
            details,
        }
    }

    #[tokio::test]
    async fn test_entry_search_covers_name_and_stream() {
        let store = MemoryStore::new(SeedData {
            entries: vec![
                entry(1, "NEET", "Medical", EntryKind::Exam),
                entry(2, "AIIMS Delhi", "medical sciences", EntryKind::College),
                entry(3, "NID", "Design", EntryKind::College),
            ],
            ..Default::default()
        });
        let filter = EntryFilter {
            search: SearchText::new("MEDICAL"),
            kind: None,
        };
        assert_eq!(store.count_entries(&filter).await.unwrap(), 2);

        let colleges = EntryFilter {
            search: SearchText::new("medical"),
            kind: Some(EntryKind::College),
        };
        let found = store
            .find_entries(&colleges, PageWindow { skip: 0, limit: 10 })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[tokio::test]
    async fn test_window_beyond_end_is_empty() {
        let store = MemoryStore::new(SeedData {
            careers: vec![crate::seed::tests::career(1, "Pilot", RiasecType::Realistic)],
            ..Default::default()
        });
        let found = store
            .find_careers(&CareerFilter::default(), PageWindow { skip: 10, limit: 10 })
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
