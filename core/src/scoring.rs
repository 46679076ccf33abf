/// Sublinear TF-IDF weight: `(1 + log10(tf)) * idf`, zero for an absent term.
pub fn tf_idf(tf: u32, idf: f64) -> f64 {
    if tf == 0 {
        return 0.0;
    }
    (1.0 + (tf as f64).log10()) * idf
}

/// `log10(N / df)`; callers only ask for terms that have postings.
pub fn inverse_document_frequency(num_docs: usize, df: usize) -> f64 {
    if df == 0 {
        return 0.0;
    }
    (num_docs as f64 / df as f64).log10()
}
