//! In-memory store with the same contract as the SQLite store

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use trackwarden_domain::traits::{ArticleStore, PersistError, TrackbackStore};
use trackwarden_domain::{ArticleId, Guid, TrackbackRecord};

/// Volatile store for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    articles: HashSet<ArticleId>,
    trackbacks: HashMap<Guid, TrackbackRecord>,
    order: Vec<Guid>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an article so trackbacks can resolve it
    pub fn register_article(&mut self, id: ArticleId) {
        self.articles.insert(id);
    }

    /// Number of stored trackbacks
    pub fn len(&self) -> usize {
        self.trackbacks.len()
    }

    /// Whether no trackbacks are stored
    pub fn is_empty(&self) -> bool {
        self.trackbacks.is_empty()
    }
}

impl TrackbackStore for MemoryStore {
    fn save(&mut self, record: &TrackbackRecord) -> Result<(), PersistError> {
        let guid = record
            .guid()
            .ok_or_else(|| PersistError::Storage("record has no GUID".to_string()))?;

        if self.trackbacks.contains_key(&guid) {
            return Err(PersistError::DuplicateGuid(guid));
        }

        self.trackbacks.insert(guid, record.clone());
        self.order.push(guid);
        Ok(())
    }

    fn find_by_guid(&self, guid: Guid) -> Result<Option<TrackbackRecord>, PersistError> {
        Ok(self.trackbacks.get(&guid).cloned())
    }

    fn list_for_article(&self, id: &ArticleId) -> Result<Vec<TrackbackRecord>, PersistError> {
        Ok(self
            .order
            .iter()
            .filter_map(|guid| self.trackbacks.get(guid))
            .filter(|record| &record.article_id == id)
            .cloned()
            .collect())
    }
}

impl ArticleStore for MemoryStore {
    type Error = Infallible;

    fn resolve_article(&self, id: &ArticleId) -> Result<bool, Self::Error> {
        Ok(self.articles.contains(id))
    }
}
