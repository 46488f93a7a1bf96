//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, PilumArgs};
use crate::error::Result;
use crate::index::manifest::IndexManifest;

/// Result structure for index builds.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexBuildResult {
    pub path: String,
    pub documents: usize,
    pub terms: usize,
    pub postings: u64,
    pub postings_bytes: u64,
    pub lexicon_bytes: u64,
    pub catalog_bytes: u64,
    pub duration_ms: u64,
}

/// One result row of a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub label: String,
    pub doc_no: String,
    pub rank: usize,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Result structure for index validation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    pub path: String,
    pub files_checked: usize,
    pub terms_checked: usize,
    pub problems: Vec<String>,
}

/// Index statistics, as recorded in the manifest.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStats {
    pub path: String,
    pub format_version: u32,
    pub created_at: String,
    pub documents: usize,
    pub terms: usize,
    pub postings: u64,
    pub total_tokens: u64,
    pub average_document_length: f64,
    pub k1: f64,
    pub b: f64,
    pub index_size_bytes: u64,
}

impl IndexStats {
    pub fn from_manifest(path: String, manifest: &IndexManifest) -> Self {
        IndexStats {
            path,
            format_version: manifest.format_version,
            created_at: manifest.created_at.to_rfc3339(),
            documents: manifest.document_count,
            terms: manifest.term_count,
            postings: manifest.posting_count,
            total_tokens: manifest.total_tokens,
            average_document_length: manifest.average_document_length,
            k1: manifest.k1,
            b: manifest.b,
            index_size_bytes: manifest.postings.size + manifest.lexicon.size + manifest.catalog.size,
        }
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &PilumArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output query results.
///
/// Human output is one `label doc_no rank score` line per row, followed by
/// the row's summary when there is one.
pub fn output_rows(rows: &[ResultRow], args: &PilumArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            for line in format_rows(rows) {
                println!("{line}");
            }
            Ok(())
        }
        OutputFormat::Json => output_json(&rows, args),
    }
}

/// Render result rows as human-readable lines.
pub fn format_rows(rows: &[ResultRow]) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        lines.push(format!(
            "{} {} {} {:.6}",
            row.label, row.doc_no, row.rank, row.score
        ));
        if let Some(summary) = &row.summary {
            lines.push(summary.clone());
            lines.push(String::new());
        }
    }
    lines
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &PilumArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    output_generic_human(&value, 0);
    Ok(())
}

/// Generic human output: one `key: value` line per field.
fn output_generic_human(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                match value {
                    serde_json::Value::Object(_) => {
                        println!("{pad}{key}:");
                        output_generic_human(value, indent + 1);
                    }
                    serde_json::Value::Array(items) if items.is_empty() => {
                        println!("{pad}{key}: none");
                    }
                    serde_json::Value::Array(items) => {
                        println!("{pad}{key}:");
                        for item in items {
                            println!("{pad}  - {}", scalar(item));
                        }
                    }
                    _ => println!("{pad}{key}: {}", scalar(value)),
                }
            }
        }
        other => println!("{pad}{}", scalar(other)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PilumArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rank: usize, summary: Option<&str>) -> ResultRow {
        ResultRow {
            label: "401".to_string(),
            doc_no: format!("LA{rank}"),
            rank,
            score: 1.5,
            summary: summary.map(str::to_string),
        }
    }

    #[test]
    fn test_format_rows() {
        let lines = format_rows(&[row(1, None), row(2, Some("A summary."))]);
        assert_eq!(
            lines,
            vec![
                "401 LA1 1 1.500000".to_string(),
                "401 LA2 2 1.500000".to_string(),
                "A summary.".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_row_json_skips_missing_summary() {
        let json = serde_json::to_string(&row(1, None)).unwrap();
        assert!(!json.contains("summary"));
        assert!(json.contains("\"doc_no\":\"LA1\""));
    }
}
