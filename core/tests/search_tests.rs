use folio_core::query::{
    boolean_search, category_search, fuzzy_search, general_search, phrase_search, proximity_search, title_search,
    FUZZY_RERANK_DEPTH,
};
use folio_core::scoring::tf_idf;
use folio_core::{sort_results, DocumentRecord, FuzzyRatio, RapidFuzz, SearchHit, SearchIndex, SortKey};
use std::collections::BTreeSet;

fn record(title: &str, category: &str, text: &str) -> DocumentRecord {
    DocumentRecord {
        path: format!("pdfs/{category}/{title}.pdf"),
        category: category.to_string(),
        title: title.to_string(),
        text: text.to_string(),
    }
}

fn ids(hits: &[SearchHit]) -> Vec<u32> { hits.iter().map(|h| h.doc_id).collect() }

/// Deterministic stand-in for the fuzzy collaborator.
struct StubRatio;

impl FuzzyRatio for StubRatio {
    fn partial_ratio(&self, a: &str, b: &str) -> u8 {
        if b.contains(a) { 100 } else { 10 }
    }
    fn token_set_ratio(&self, _a: &str, b: &str) -> u8 { (b.len() % 101) as u8 }
}

fn three_doc_index() -> SearchIndex {
    SearchIndex::build(vec![
        record("One", "Guides", &"alpha beta ".repeat(5)),
        record("Two", "guides ", "alpha"),
        record("Three", "Papers", "gamma delta"),
    ])
}

#[test]
fn ranked_search_orders_by_tf_idf() {
    let index = three_doc_index();
    let hits = sort_results(general_search(&index, "alpha"), &index, SortKey::Relevance, false);
    assert_eq!(ids(&hits), vec![1, 2]);
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn single_term_score_is_exact_tf_idf() {
    let index = three_doc_index();
    let idf = index.idf("alpha").unwrap();
    let hits = general_search(&index, "ALPHA");
    assert_eq!(hits[0], SearchHit { doc_id: 1, score: tf_idf(5, idf) });
    assert_eq!(hits[1], SearchHit { doc_id: 2, score: tf_idf(1, idf) });
}

#[test]
fn unknown_and_empty_queries_are_empty() {
    let index = three_doc_index();
    assert!(general_search(&index, "omega").is_empty());
    assert!(general_search(&index, "").is_empty());
    assert!(general_search(&index, "the and of").is_empty());
}

#[test]
fn idf_is_non_negative_and_df_bounded() {
    let index = three_doc_index();
    for term in ["alpha", "beta", "gamma", "delta"] {
        assert!(index.idf(term).unwrap() >= 0.0);
        assert!(index.postings(term).unwrap().len() <= index.num_docs());
    }
}

#[test]
fn category_search_filters_case_and_whitespace_insensitively() {
    let index = three_doc_index();
    assert_eq!(ids(&category_search(&index, "alpha", "  GUIDES ")), vec![1, 2]);
    assert!(category_search(&index, "alpha", "papers").is_empty());
    assert!(category_search(&index, "alpha", "nowhere").is_empty());
}

#[test]
fn blank_category_matches_ranked_search() {
    let index = three_doc_index();
    assert_eq!(category_search(&index, "alpha beta", ""), general_search(&index, "alpha beta"));
    assert_eq!(category_search(&index, "alpha beta", "   "), general_search(&index, "alpha beta"));
}

fn boolean_index() -> SearchIndex {
    SearchIndex::build(vec![
        record("d1", "x", "apple banana cherry"),
        record("d2", "x", "apple"),
        record("d3", "x", "banana cherry"),
        record("d4", "x", "cherry"),
    ])
}

#[test]
fn boolean_is_left_to_right_without_precedence() {
    let index = boolean_index();
    assert_eq!(ids(&boolean_search(&index, "apple or banana and cherry")), vec![1, 3]);
    assert_eq!(ids(&boolean_search(&index, "Cherry NOT banana")), vec![4]);
    assert_eq!(ids(&boolean_search(&index, "apple and durian")), Vec::<u32>::new());
    assert_eq!(ids(&boolean_search(&index, "durian or apple")), vec![1, 2]);
}

#[test]
fn boolean_scores_are_text_lengths() {
    let index = boolean_index();
    let hits = boolean_search(&index, "banana");
    assert_eq!(hits, vec![
        SearchHit { doc_id: 1, score: 19.0 },
        SearchHit { doc_id: 3, score: 13.0 },
    ]);
}

#[test]
fn boolean_operand_is_a_literal_term() {
    let index = boolean_index();
    // A multi-word operand is never in the index.
    assert!(boolean_search(&index, "apple banana").is_empty());
    assert!(boolean_search(&index, "").is_empty());
}

#[test]
fn phrase_search_is_case_insensitive() {
    let index = SearchIndex::build(vec![
        record("a", "x", "Chapter 3: Error Handling in depth"),
        record("b", "x", "error and handling"),
    ]);
    let upper = phrase_search(&index, "Error Handling");
    let lower = phrase_search(&index, "error handling");
    assert_eq!(upper, vec![SearchHit { doc_id: 1, score: 14.0 }]);
    assert_eq!(upper, lower);
    assert!(phrase_search(&index, "").is_empty());
}

#[test]
fn proximity_respects_max_distance() {
    let index = SearchIndex::build(vec![record("p", "x", "alpha x beta")]);
    let terms = vec!["alpha".to_string(), "beta".to_string()];
    assert_eq!(proximity_search(&index, &terms, 2), vec![SearchHit { doc_id: 1, score: 0.0 }]);
    assert!(proximity_search(&index, &terms, 1).is_empty());
}

#[test]
fn proximity_pairs_each_adjacent_term_pair() {
    let index = SearchIndex::build(vec![record("p", "x", "alpha beta x gamma")]);
    let terms = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
    // alpha-beta at distance 1, beta-gamma at distance 2; alpha-gamma is never paired.
    let hits = proximity_search(&index, &terms, 3);
    assert_eq!(hits, vec![SearchHit { doc_id: 1, score: 2.0 }, SearchHit { doc_id: 1, score: 1.0 }]);
    let hits = proximity_search(&index, &terms, 1);
    assert_eq!(hits, vec![SearchHit { doc_id: 1, score: 0.0 }]);
}

#[test]
fn proximity_emits_one_hit_per_close_position() {
    let index = SearchIndex::build(vec![record("p", "x", "Alpha beta alpha beta"), record("q", "x", "beta")]);
    let terms = vec!["alpha".to_string(), "BETA".to_string()];
    let hits = proximity_search(&index, &terms, 3);
    assert_eq!(hits, vec![SearchHit { doc_id: 1, score: 2.0 }, SearchHit { doc_id: 1, score: 2.0 }]);
    assert!(proximity_search(&index, &terms[..1], 3).is_empty());
}

#[test]
fn title_search_exact_title_scores_full_marks() {
    let index = SearchIndex::build(vec![
        record("Distributed Systems Primer", "x", ""),
        record("Cooking With Lentils", "x", ""),
    ]);
    let hits = title_search(&index, &RapidFuzz, "distributed systems primer");
    assert_eq!(hits, vec![SearchHit { doc_id: 1, score: 100.0 }]);
}

#[test]
fn title_search_threshold_is_strict() {
    let index = SearchIndex::build(vec![record("Kernel Notes", "x", ""), record("Other", "x", "")]);
    assert_eq!(ids(&title_search(&index, &StubRatio, "KERNEL")), vec![1]);
    assert!(title_search(&index, &StubRatio, "absent").is_empty());
}

/// Returns a fixed partial ratio per title.
struct FixedRatio;

impl FuzzyRatio for FixedRatio {
    fn partial_ratio(&self, _a: &str, b: &str) -> u8 {
        match b {
            "at sixty" => 60,
            "at sixty one" => 61,
            _ => 0,
        }
    }
    fn token_set_ratio(&self, _a: &str, _b: &str) -> u8 { 0 }
}

#[test]
fn title_search_excludes_ratio_of_exactly_sixty() {
    let index = SearchIndex::build(vec![record("At Sixty", "x", ""), record("At Sixty One", "x", "")]);
    let hits = title_search(&index, &FixedRatio, "anything");
    assert_eq!(hits, vec![SearchHit { doc_id: 2, score: 61.0 }]);
}

#[test]
fn fuzzy_search_rescores_only_the_top_hits() {
    let mut records: Vec<DocumentRecord> = (1..=25)
        .map(|i| record(&format!("doc{i}"), "x", &"alpha ".repeat(i)))
        .collect();
    records.extend((0..5).map(|i| record(&format!("filler{i}"), "x", "unrelated words")));
    let index = SearchIndex::build(records);

    let hits = fuzzy_search(&index, &StubRatio, "alpha");
    assert_eq!(hits.len(), FUZZY_RERANK_DEPTH);
    let top: BTreeSet<u32> = (6..=25).collect();
    assert_eq!(ids(&hits).into_iter().collect::<BTreeSet<u32>>(), top);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn fuzzy_search_rescores_on_percent_scale() {
    let index = SearchIndex::build(vec![
        record("Doc A", "x", "alpha beta gamma"),
        record("Doc B", "x", "alpha delta"),
        record("Doc C", "x", "gamma only"),
    ]);
    let hits = fuzzy_search(&index, &RapidFuzz, "Alpha Beta");
    // Doc B: best of "alpha beta" against "alpha b delta doc" is 2*10/27.
    assert_eq!(hits, vec![SearchHit { doc_id: 1, score: 100.0 }, SearchHit { doc_id: 2, score: 74.0 }]);
}

#[test]
fn fuzzy_search_with_no_matches_is_empty() {
    let index = three_doc_index();
    assert!(fuzzy_search(&index, &RapidFuzz, "zzz").is_empty());
}
