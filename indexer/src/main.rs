use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_core::query::{
    boolean_search, category_search, fuzzy_search, general_search, phrase_search, proximity_search, title_search,
};
use folio_core::{into_records, load_corpus, sort_results, DocId, RapidFuzz, SearchHit, SearchIndex, SortKey};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a TF-IDF index over a document corpus and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus and print document, term and category counts
    Inspect {
        /// Corpus directory of .txt files, or a .json/.jsonl manifest
        #[arg(long)]
        corpus: String,
    },
    /// Index the corpus and run a single query
    Query {
        /// Corpus directory of .txt files, or a .json/.jsonl manifest
        #[arg(long)]
        corpus: String,
        /// relevance, title, category or length
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long, default_value_t = false)]
        ascending: bool,
        #[command(subcommand)]
        kind: QueryKind,
    },
}

#[derive(Subcommand)]
enum QueryKind {
    /// Ranked TF-IDF search
    Search { query: String },
    /// Ranked search within one category
    Category {
        query: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Left-to-right and/or/not over literal terms
    Boolean { query: String },
    /// Case-insensitive substring match
    Phrase { phrase: String },
    /// Adjacent terms within a token distance
    Proximity {
        #[arg(value_delimiter = ',', required = true)]
        terms: Vec<String>,
        /// A negative distance matches nothing
        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        max_distance: i64,
    },
    /// Fuzzy match against titles
    Title { query: String },
    /// TF-IDF candidates re-scored by fuzzy content match
    Fuzzy { query: String },
}

#[derive(Serialize)]
struct HitRecord<'a> {
    doc_id: DocId,
    score: f64,
    title: &'a str,
    category: &'a str,
    path: &'a str,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { corpus } => {
            let index = build_index(&corpus)?;
            println!("{}", serde_json::to_string_pretty(&index.stats())?);
        }
        Commands::Query { corpus, sort_by, ascending, kind } => {
            let index = build_index(&corpus)?;
            let hits = run_query(&index, &kind, sort_by.as_deref(), ascending);
            let records: Vec<HitRecord> = hits
                .iter()
                .filter_map(|hit| {
                    let doc = index.document(hit.doc_id)?;
                    Some(HitRecord {
                        doc_id: hit.doc_id,
                        score: hit.score,
                        title: &doc.title,
                        category: &doc.category,
                        path: &doc.path,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}

fn build_index(corpus: &str) -> Result<SearchIndex> {
    let sources = load_corpus(corpus)?;
    Ok(SearchIndex::build(into_records(sources)))
}

fn run_query(index: &SearchIndex, kind: &QueryKind, sort_by: Option<&str>, ascending: bool) -> Vec<SearchHit> {
    let hits = match kind {
        QueryKind::Search { query } => general_search(index, query),
        QueryKind::Category { query, category } => category_search(index, query, category),
        QueryKind::Boolean { query } => boolean_search(index, query),
        QueryKind::Phrase { phrase } => phrase_search(index, phrase),
        QueryKind::Proximity { terms, max_distance } => {
            let terms: Vec<String> = terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            match usize::try_from(*max_distance) {
                Ok(max_distance) => proximity_search(index, &terms, max_distance),
                Err(_) => Vec::new(),
            }
        }
        QueryKind::Title { query } => title_search(index, &RapidFuzz, query),
        QueryKind::Fuzzy { query } => fuzzy_search(index, &RapidFuzz, query),
    };
    tracing::debug!(total_hits = hits.len(), "query complete");
    // Boolean hits stay in ascending doc id unless an order was requested.
    if matches!(kind, QueryKind::Boolean { .. }) && sort_by.is_none() {
        return hits;
    }
    let key = sort_by.map(SortKey::from).unwrap_or_default();
    sort_results(hits, index, key, ascending)
}
