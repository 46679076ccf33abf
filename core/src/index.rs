use crate::scoring::inverse_document_frequency;
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub type DocId = u32;
/// Raw term frequency per document for a single term.
pub type Postings = HashMap<DocId, u32>;

/// Category assigned to documents that sit at the corpus root.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Input to the index build: one extracted document with its resolved title.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub path: String,
    pub category: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub category: String,
    pub path: String,
    pub text: String,
    #[serde(skip)]
    lowered: String,
    #[serde(skip)]
    text_len: usize,
}

impl Document {
    fn new(id: DocId, record: DocumentRecord) -> Self {
        let lowered = record.text.to_lowercase();
        let text_len = record.text.chars().count();
        Self {
            id,
            title: record.title,
            category: record.category,
            path: record.path,
            text: record.text,
            lowered,
            text_len,
        }
    }

    /// Full text, lowercased once at build time.
    pub fn lowered_text(&self) -> &str { &self.lowered }

    /// Length of the full text in characters.
    pub fn text_len(&self) -> usize { self.text_len }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub categories: BTreeMap<String, usize>,
}

/// Document store, inverted index and IDF table, built once and read-only
/// afterwards. Share it behind an `Arc` for concurrent readers.
#[derive(Debug)]
pub struct SearchIndex {
    docs: BTreeMap<DocId, Document>,
    postings: HashMap<String, Postings>,
    idf: HashMap<String, f64>,
}

impl SearchIndex {
    /// Index every record in one pass. Ids are assigned from 1 in input order.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DocumentRecord>,
    {
        let mut docs: BTreeMap<DocId, Document> = BTreeMap::new();
        let mut postings: HashMap<String, Postings> = HashMap::new();
        let mut next_doc_id: DocId = 1;

        for record in records {
            let doc_id = next_doc_id;
            next_doc_id += 1;

            let mut tf_counts: HashMap<String, u32> = HashMap::new();
            for term in tokenize(&record.text) {
                *tf_counts.entry(term).or_insert(0) += 1;
            }
            for (term, tf) in tf_counts {
                postings.entry(term).or_default().insert(doc_id, tf);
            }

            docs.insert(doc_id, Document::new(doc_id, record));
        }

        let num_docs = docs.len();
        let idf = postings
            .iter()
            .map(|(term, plist)| (term.clone(), inverse_document_frequency(num_docs, plist.len())))
            .collect();

        tracing::info!(num_docs, num_terms = postings.len(), "index build complete");
        Self { docs, postings, idf }
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.docs.get(&doc_id) }

    /// All documents in ascending id order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.docs.values() }

    pub fn postings(&self, term: &str) -> Option<&Postings> { self.postings.get(term) }

    /// IDF of an indexed term; `None` for terms with no postings.
    pub fn idf(&self, term: &str) -> Option<f64> { self.idf.get(term).copied() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn stats(&self) -> IndexStats {
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for doc in self.docs.values() {
            *categories.entry(doc.category.clone()).or_insert(0) += 1;
        }
        IndexStats { num_docs: self.num_docs(), num_terms: self.num_terms(), categories }
    }
}
