use async_trait::async_trait;
use log::{ debug, info };
use serde::{ Deserialize, Serialize };
use std::cmp::Ordering;
use std::collections::HashSet;
use std::error::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::parser::ParsedCase;

const MIN_TERM_LEN: usize = 3;
const OVERLAP_WEIGHT: f32 = 0.8;
const NAME_WEIGHT: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCase {
    pub id: Uuid,
    pub case_name: String,
    pub raw_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCase {
    pub score: f32,
    pub case: IndexedCase,
}

#[async_trait]
pub trait CaseIndex: Send + Sync {
    /// Removes every indexed case.
    async fn reset(&self) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn insert(&self, case: &ParsedCase) -> Result<IndexedCase, Box<dyn Error + Send + Sync>>;

    /// Swaps the whole index for `cases` in one step; readers never observe
    /// a partially replaced index. Returns the number of cases now indexed.
    async fn replace_all(&self, cases: &[ParsedCase]) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// Best match first. An empty result means nothing matched.
    async fn search(
        &self,
        query: &str,
        limit: usize
    ) -> Result<Vec<ScoredCase>, Box<dyn Error + Send + Sync>>;

    async fn count(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;
}

struct Entry {
    case: IndexedCase,
    terms: HashSet<String>,
}

/// Lexical in-process index: term overlap with the case text, nudged by how
/// close the query is to the case name.
#[derive(Default)]
pub struct MemoryCaseIndex {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryCaseIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn entry_for(case: &ParsedCase) -> Entry {
    let indexed = IndexedCase {
        id: Uuid::new_v4(),
        case_name: case.case_name.clone(),
        raw_text: case.chunk_text(),
    };
    Entry {
        terms: terms(&indexed.raw_text),
        case: indexed,
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl CaseIndex for MemoryCaseIndex {
    async fn reset(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut entries = self.entries.write().await;
        info!("Clearing {} indexed cases", entries.len());
        entries.clear();
        Ok(())
    }

    async fn insert(&self, case: &ParsedCase) -> Result<IndexedCase, Box<dyn Error + Send + Sync>> {
        let entry = entry_for(case);
        let indexed = entry.case.clone();
        self.entries.write().await.push(entry);
        debug!("Indexed case '{}' ({})", indexed.case_name, indexed.id);
        Ok(indexed)
    }

    async fn replace_all(&self, cases: &[ParsedCase]) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let fresh: Vec<Entry> = cases.iter().map(entry_for).collect();
        let mut entries = self.entries.write().await;
        info!("Replacing {} indexed cases with {}", entries.len(), fresh.len());
        *entries = fresh;
        Ok(entries.len())
    }

    async fn search(
        &self,
        query: &str,
        limit: usize
    ) -> Result<Vec<ScoredCase>, Box<dyn Error + Send + Sync>> {
        let query_terms = terms(query);
        if query_terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let lower_query = query.to_lowercase();

        let entries = self.entries.read().await;
        let mut hits: Vec<ScoredCase> = entries
            .iter()
            .filter_map(|entry| {
                let matched = query_terms.intersection(&entry.terms).count();
                if matched == 0 {
                    return None;
                }
                let overlap = (matched as f32) / (query_terms.len() as f32);
                let name_similarity = strsim::jaro_winkler(
                    &lower_query,
                    &entry.case.case_name.to_lowercase()
                ) as f32;
                Some(ScoredCase {
                    score: OVERLAP_WEIGHT * overlap + NAME_WEIGHT * name_similarity,
                    case: entry.case.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);
        debug!("Search '{}' matched {} cases", query, hits.len());
        Ok(hits)
    }

    async fn count(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Ok(self.entries.read().await.len())
    }
}
