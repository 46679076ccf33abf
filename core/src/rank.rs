use crate::index::{Document, SearchIndex};
use crate::query::SearchHit;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Relevance,
    Title,
    Category,
    Length,
}

impl From<&str> for SortKey {
    /// Unknown names fall back to relevance.
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "title" => SortKey::Title,
            "category" => SortKey::Category,
            "length" => SortKey::Length,
            _ => SortKey::Relevance,
        }
    }
}

fn sort_keyed<K, F, C>(results: Vec<SearchHit>, ascending: bool, key: F, cmp: C) -> Vec<SearchHit>
where
    F: Fn(&SearchHit) -> K,
    C: Fn(&K, &K) -> Ordering,
{
    let mut keyed: Vec<(K, SearchHit)> = results.into_iter().map(|hit| (key(&hit), hit)).collect();
    // slice::sort_by is stable, so ties keep their input order in both directions.
    keyed.sort_by(|a, b| {
        let ord = cmp(&a.0, &b.0);
        if ascending { ord } else { ord.reverse() }
    });
    keyed.into_iter().map(|(_, hit)| hit).collect()
}

/// Order hits by score or by a property of the referenced document.
pub fn sort_results(results: Vec<SearchHit>, index: &SearchIndex, key: SortKey, ascending: bool) -> Vec<SearchHit> {
    let lowered = |hit: &SearchHit, field: fn(&Document) -> &str| {
        index.document(hit.doc_id).map(|doc| field(doc).to_lowercase()).unwrap_or_default()
    };
    match key {
        SortKey::Relevance => sort_keyed(results, ascending, |hit| hit.score, f64::total_cmp),
        SortKey::Title => sort_keyed(results, ascending, |hit| lowered(hit, title_of), String::cmp),
        SortKey::Category => sort_keyed(results, ascending, |hit| lowered(hit, category_of), String::cmp),
        SortKey::Length => sort_keyed(
            results,
            ascending,
            |hit| index.document(hit.doc_id).map_or(0, Document::text_len),
            usize::cmp,
        ),
    }
}

fn title_of(doc: &Document) -> &str { &doc.title }

fn category_of(doc: &Document) -> &str { &doc.category }
