use crate::index::{DocumentRecord, UNCATEGORIZED};
use crate::title::{resolve_title, LayoutLine};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use walkdir::WalkDir;

/// What the text-extraction step hands to the indexer for one document.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDocument {
    pub path: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub text: String,
    /// First-page lines with their average font size.
    #[serde(default)]
    pub layout: Vec<LayoutLine>,
}

fn default_category() -> String { UNCATEGORIZED.to_string() }

/// Load a corpus from a directory of `.txt` files or a `.json`/`.jsonl` manifest.
///
/// Fails if the source cannot be read or contains no documents.
pub fn load_corpus<P: AsRef<Path>>(root: P) -> Result<Vec<SourceDocument>> {
    let root = root.as_ref();
    let docs = if root.is_dir() {
        load_dir(root)?
    } else if root.is_file() {
        match root.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => load_jsonl(root)?,
            Some("json") => load_json(root)?,
            _ => bail!("unsupported corpus file {}: expected .json or .jsonl", root.display()),
        }
    } else {
        bail!("corpus path {} does not exist", root.display());
    };

    if docs.is_empty() {
        bail!("corpus at {} contains no documents", root.display());
    }
    tracing::info!(root = %root.display(), num_docs = docs.len(), "loaded corpus");
    Ok(docs)
}

fn load_dir(root: &Path) -> Result<Vec<SourceDocument>> {
    let mut docs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking corpus {}", root.display()))?;
        let p = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if p.extension().and_then(|s| s.to_str()).map(|e| e.eq_ignore_ascii_case("txt")) != Some(true) {
            continue;
        }

        let parent = p.parent().unwrap_or(root);
        let category = if parent == root {
            UNCATEGORIZED.to_string()
        } else {
            parent
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(default_category)
        };
        let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
        docs.push(SourceDocument { path: p.to_string_lossy().into_owned(), category, text, layout: Vec::new() });
    }
    Ok(docs)
}

fn load_jsonl(file: &Path) -> Result<Vec<SourceDocument>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let mut docs = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: SourceDocument = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed record", file.display(), lineno + 1))?;
        docs.push(doc);
    }
    Ok(docs)
}

fn load_json(file: &Path) -> Result<Vec<SourceDocument>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value =
        serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<SourceDocument>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => bail!("{}: expected a record or an array of records", file.display()),
    };
    Ok(docs)
}

/// Resolve titles, turning extracted sources into index records.
pub fn into_records(sources: Vec<SourceDocument>) -> Vec<DocumentRecord> {
    sources
        .into_iter()
        .map(|src| {
            let filename = Path::new(&src.path)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| src.path.clone());
            let title = resolve_title(&src.layout, &src.text, &filename);
            DocumentRecord { path: src.path, category: src.category, title, text: src.text }
        })
        .collect()
}
