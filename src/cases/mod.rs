pub mod index;
pub mod ingest;
pub mod parser;

pub use index::{ CaseIndex, IndexedCase, MemoryCaseIndex, ScoredCase };
pub use ingest::{ CaseIngestor, IngestError };
pub use parser::{ parse_case, split_into_cases, ParsedCase, RawCase };
