use log::{ info, warn };
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::index::CaseIndex;
use super::parser::{ parse_case, split_into_cases };
use crate::contract::{ validate_upload_response, ValidationError };
use crate::models::UploadResponse;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Rules uploaded and indexed successfully.";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read rules file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("case index error: {0}")]
    Index(Box<dyn std::error::Error + Send + Sync>),
    #[error("upload response rejected: {0}")]
    Contract(#[from] ValidationError),
}

/// Turns an uploaded rules document into indexed cases. Each upload replaces
/// whatever was indexed before.
#[derive(Clone)]
pub struct CaseIngestor {
    index: Arc<dyn CaseIndex>,
}

impl CaseIngestor {
    pub fn new(index: Arc<dyn CaseIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> Arc<dyn CaseIndex> {
        self.index.clone()
    }

    pub async fn ingest_text(&self, text: &str) -> Result<UploadResponse, IngestError> {
        let parsed: Vec<_> = split_into_cases(text).iter().map(parse_case).collect();
        if parsed.is_empty() {
            warn!("Uploaded document contains no 'CASE <n>:' headers");
        }

        let indexed = self.index.replace_all(&parsed).await.map_err(IngestError::Index)?;
        info!("Indexed {} cases", indexed);

        let response = UploadResponse::new(UPLOAD_SUCCESS_MESSAGE, indexed as u64);
        let wire = serde_json::to_value(&response).map_err(ValidationError::from)?;
        Ok(validate_upload_response(&wire)?)
    }

    pub async fn ingest_file<P: AsRef<Path>>(&self, path: P) -> Result<UploadResponse, IngestError> {
        let path = path.as_ref();
        info!("Reading rules from {}", path.display());
        let text = tokio::fs::read_to_string(path).await.map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.ingest_text(&text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::index::MemoryCaseIndex;

    fn ingestor() -> CaseIngestor {
        CaseIngestor::new(Arc::new(MemoryCaseIndex::new()))
    }

    #[tokio::test]
    async fn reports_number_of_cases_indexed() {
        let ingestor = ingestor();
        let resp = ingestor
            .ingest_text("CASE 1: Late\nTone Guidelines\n- calm\nCASE 2: Rude\n- nothing")
            .await
            .unwrap();
        assert_eq!(resp, UploadResponse::new(UPLOAD_SUCCESS_MESSAGE, 2));
        assert_eq!(ingestor.index().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_upload_is_a_zero_count_success() {
        let resp = ingestor().ingest_text("").await.unwrap();
        assert_eq!(resp.cases_indexed, 0);
        assert!(resp.is_empty());
    }

    #[tokio::test]
    async fn second_upload_replaces_first() {
        let ingestor = ingestor();
        ingestor.ingest_text("CASE 1: A\nCASE 2: B\nCASE 3: C").await.unwrap();
        let resp = ingestor.ingest_text("CASE 1: Only one").await.unwrap();
        assert_eq!(resp.cases_indexed, 1);
        assert_eq!(ingestor.index().count().await.unwrap(), 1);
    }

    fn document(prefix: &str, cases: usize) -> String {
        (1..=cases).map(|i| format!("CASE {}: {} {}\n- item\n", i, prefix, i)).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_uploads_never_mix_documents() {
        for _ in 0..50 {
            let ingestor = ingestor();
            let first = ingestor.clone();
            let second = ingestor.clone();
            let a = tokio::spawn(async move { first.ingest_text(&document("Alpha", 20)).await });
            let b = tokio::spawn(async move { second.ingest_text(&document("Beta", 20)).await });
            assert_eq!(a.await.unwrap().unwrap().cases_indexed, 20);
            assert_eq!(b.await.unwrap().unwrap().cases_indexed, 20);

            assert_eq!(ingestor.index().count().await.unwrap(), 20);
            let alpha = ingestor.index().search("alpha", 40).await.unwrap().len();
            let beta = ingestor.index().search("beta", 40).await.unwrap().len();
            assert!(
                (alpha, beta) == (20, 0) || (alpha, beta) == (0, 20),
                "mixed index: {} alpha, {} beta",
                alpha,
                beta
            );
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = ingestor().ingest_file("/definitely/not/here/rules.txt").await;
        assert!(matches!(result, Err(IngestError::Io { .. })));
    }
}
