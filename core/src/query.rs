use crate::fuzzy::FuzzyRatio;
use crate::index::{DocId, Document, SearchIndex};
use crate::scoring::tf_idf;
use crate::tokenizer::tokenize;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Number of TF-IDF hits re-scored by [`fuzzy_search`].
pub const FUZZY_RERANK_DEPTH: usize = 20;
/// Title matches must score strictly above this partial ratio.
pub const TITLE_MATCH_THRESHOLD: u8 = 60;

lazy_static! {
    static ref BOOL_OP: Regex = Regex::new(r"\s+(and|or|not)\s+").expect("valid regex");
}

/// A document and its score. Scores are only comparable within one query kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
}

fn accumulate<F>(index: &SearchIndex, terms: &[String], keep: F) -> Vec<SearchHit>
where
    F: Fn(&Document) -> bool,
{
    let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
    for term in terms {
        let (Some(plist), Some(idf)) = (index.postings(term), index.idf(term)) else { continue };
        for (&doc_id, &tf) in plist {
            if !index.document(doc_id).is_some_and(&keep) {
                continue;
            }
            *scores.entry(doc_id).or_insert(0.0) += tf_idf(tf, idf);
        }
    }
    scores
        .into_iter()
        .filter(|(_, score)| *score != 0.0)
        .map(|(doc_id, score)| SearchHit { doc_id, score })
        .collect()
}

/// Ranked retrieval: sum of TF-IDF weights of the query terms per document.
pub fn general_search(index: &SearchIndex, query: &str) -> Vec<SearchHit> {
    accumulate(index, &tokenize(query), |_| true)
}

/// Ranked retrieval restricted to one category. Matching ignores case and
/// surrounding whitespace; a blank category means no filter.
pub fn category_search(index: &SearchIndex, query: &str, category: &str) -> Vec<SearchHit> {
    let wanted = category.trim().to_lowercase();
    if wanted.is_empty() {
        return general_search(index, query);
    }
    accumulate(index, &tokenize(query), |doc| doc.category.trim().to_lowercase() == wanted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

impl BoolOp {
    fn from_word(word: &str) -> Self {
        match word {
            "or" => BoolOp::Or,
            "not" => BoolOp::Not,
            _ => BoolOp::And,
        }
    }
}

/// One operand of a boolean query and the operator joining it to everything
/// before it. The first clause has no operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolClause {
    pub op: Option<BoolOp>,
    pub term: String,
}

/// Split a lowercased query on whitespace-delimited `and`/`or`/`not`.
/// Operand text is kept verbatim (trimmed) rather than tokenized.
pub fn parse_boolean(query: &str) -> Vec<BoolClause> {
    let query = query.to_lowercase();
    let mut clauses = Vec::new();
    let mut pending: Option<BoolOp> = None;
    let mut last = 0;
    for caps in BOOL_OP.captures_iter(&query) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else { continue };
        clauses.push(BoolClause { op: pending, term: query[last..whole.start()].trim().to_string() });
        pending = Some(BoolOp::from_word(word.as_str()));
        last = whole.end();
    }
    clauses.push(BoolClause { op: pending, term: query[last..].trim().to_string() });
    clauses
}

/// Boolean retrieval evaluated strictly left to right with no precedence, so
/// `a or b and c` is `(a or b) and c`. Each hit scores the character length of
/// its document text. Hits come back in ascending id order.
pub fn boolean_search(index: &SearchIndex, query: &str) -> Vec<SearchHit> {
    let clauses = parse_boolean(query);
    tracing::debug!(?clauses, "boolean query parsed");

    let mut results: Option<BTreeSet<DocId>> = None;
    for clause in clauses {
        let docs: BTreeSet<DocId> = index
            .postings(&clause.term)
            .map(|plist| plist.keys().copied().collect())
            .unwrap_or_default();
        results = Some(match (results, clause.op) {
            (None, _) => docs,
            (Some(acc), Some(BoolOp::Or)) => &acc | &docs,
            (Some(acc), Some(BoolOp::Not)) => &acc - &docs,
            (Some(acc), Some(BoolOp::And) | None) => &acc & &docs,
        });
    }

    results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|doc_id| index.document(doc_id))
        .map(|doc| SearchHit { doc_id: doc.id, score: doc.text_len() as f64 })
        .collect()
}

/// Case-insensitive substring match. Every hit scores the phrase length.
pub fn phrase_search(index: &SearchIndex, phrase: &str) -> Vec<SearchHit> {
    if phrase.is_empty() {
        return Vec::new();
    }
    let needle = phrase.to_lowercase();
    let score = phrase.chars().count() as f64;
    index
        .documents()
        .filter(|doc| doc.lowered_text().contains(&needle))
        .map(|doc| SearchHit { doc_id: doc.id, score })
        .collect()
}

/// Proximity retrieval over whitespace-split text.
///
/// For each adjacent pair of `terms` and each position `p1` of the first term,
/// the first position `p2` of the second term within `max_distance` yields a
/// hit scored `max_distance - |p1 - p2|`. A document produces one hit per such
/// `p1`, so the same id can appear several times.
pub fn proximity_search(index: &SearchIndex, terms: &[String], max_distance: usize) -> Vec<SearchHit> {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    let mut hits = Vec::new();
    if terms.len() < 2 {
        return hits;
    }

    for doc in index.documents() {
        let mut positions: HashMap<&str, Vec<usize>> =
            terms.iter().map(|t| (t.as_str(), Vec::new())).collect();
        for (pos, word) in doc.lowered_text().split_whitespace().enumerate() {
            if let Some(list) = positions.get_mut(word) {
                list.push(pos);
            }
        }

        for pair in terms.windows(2) {
            let first = &positions[pair[0].as_str()];
            let second = &positions[pair[1].as_str()];
            for &p1 in first {
                if let Some(&p2) = second.iter().find(|&&p2| p1.abs_diff(p2) <= max_distance) {
                    let score = (max_distance - p1.abs_diff(p2)) as f64;
                    hits.push(SearchHit { doc_id: doc.id, score });
                }
            }
        }
    }
    hits
}

/// Fuzzy title match: partial ratio of the lowercased query against each
/// lowercased title, keeping scores above [`TITLE_MATCH_THRESHOLD`].
pub fn title_search(index: &SearchIndex, matcher: &dyn FuzzyRatio, query: &str) -> Vec<SearchHit> {
    let query = query.to_lowercase();
    index
        .documents()
        .filter_map(|doc| {
            let ratio = matcher.partial_ratio(&query, &doc.title.to_lowercase());
            (ratio > TITLE_MATCH_THRESHOLD).then_some(SearchHit { doc_id: doc.id, score: ratio as f64 })
        })
        .collect()
}

/// Fuzzy content match: take the best [`FUZZY_RERANK_DEPTH`] ranked hits and
/// re-score them by token-set ratio against title plus text. The result is
/// ordered by that ratio, highest first.
pub fn fuzzy_search(index: &SearchIndex, matcher: &dyn FuzzyRatio, query: &str) -> Vec<SearchHit> {
    let mut initial = general_search(index, query);
    initial.sort_by(|a, b| b.score.total_cmp(&a.score));
    initial.truncate(FUZZY_RERANK_DEPTH);

    let query = query.to_lowercase();
    let mut reranked: Vec<SearchHit> = initial
        .into_iter()
        .filter_map(|hit| {
            let doc = index.document(hit.doc_id)?;
            let block = format!("{} {}", doc.title, doc.text).to_lowercase();
            let ratio = matcher.token_set_ratio(&query, &block);
            Some(SearchHit { doc_id: hit.doc_id, score: ratio as f64 })
        })
        .collect();
    reranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    reranked
}
