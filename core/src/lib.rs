pub mod corpus;
pub mod fuzzy;
pub mod index;
pub mod query;
pub mod rank;
pub mod scoring;
pub mod title;
pub mod tokenizer;

pub use corpus::{into_records, load_corpus, SourceDocument};
pub use fuzzy::{FuzzyRatio, RapidFuzz};
pub use index::{DocId, Document, DocumentRecord, IndexStats, SearchIndex, UNCATEGORIZED};
pub use query::SearchHit;
pub use rank::{sort_results, SortKey};
pub use title::LayoutLine;
