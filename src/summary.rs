//! Query-biased document summaries.
//!
//! A summary is a handful of sentences picked from a document: sentences
//! containing more of the query's terms come first, and among equally biased
//! sentences the ones most similar to the rest of the document win. The chosen
//! sentences are emitted in document order.
//!
//! Any closure `Fn(&[String], &str) -> anyhow::Result<String>` is a
//! [`Summarizer`], which is convenient for tests and for wiring in external
//! summarization services.

use std::path::Path;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use log::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::analyzer::Analyzer;
use crate::config::SummaryConfig;
use crate::error::{PilumError, Result};
use crate::ingest::trec::{TrecDocument, TrecParser};

/// Produces a short textual summary of a result document.
pub trait Summarizer: Send + Sync {
    /// Summarize document `doc_no` with respect to normalized `query_terms`.
    fn summarize(&self, query_terms: &[String], doc_no: &str) -> Result<String>;
}

impl<F> Summarizer for F
where
    F: Fn(&[String], &str) -> anyhow::Result<String> + Send + Sync,
{
    fn summarize(&self, query_terms: &[String], doc_no: &str) -> Result<String> {
        Ok(self(query_terms, doc_no)?)
    }
}

/// A sentence with its term vector.
#[derive(Debug)]
struct Sentence {
    text: String,
    terms: AHashMap<String, u32>,
    norm: f64,
}

impl Sentence {
    fn new(text: String, analyzer: &dyn Analyzer) -> Result<Self> {
        let mut terms: AHashMap<String, u32> = AHashMap::new();
        for term in analyzer.terms(&text)? {
            *terms.entry(term).or_insert(0) += 1;
        }
        let norm = terms
            .values()
            .map(|&tf| f64::from(tf) * f64::from(tf))
            .sum::<f64>()
            .sqrt();
        Ok(Sentence { text, terms, norm })
    }

    fn cosine(&self, other: &Sentence) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        let dot: f64 = self
            .terms
            .iter()
            .filter_map(|(term, &tf)| other.terms.get(term).map(|&o| f64::from(tf) * f64::from(o)))
            .sum();
        dot / (self.norm * other.norm)
    }

    /// `matched² / |query|` over distinct query terms.
    fn query_bias(&self, query: &AHashSet<&str>) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        let matched = query.iter().filter(|t| self.terms.contains_key(**t)).count() as f64;
        matched * matched / query.len() as f64
    }
}

/// Extractive summarizer over the documents of a TREC collection.
pub struct QueryBiasedSummarizer {
    documents: AHashMap<String, TrecDocument>,
    analyzer: Arc<dyn Analyzer>,
    max_sentences: usize,
    similarity_threshold: f64,
}

impl QueryBiasedSummarizer {
    /// Load every document of `collection`.
    pub fn open<P: AsRef<Path>>(
        collection: P,
        analyzer: Arc<dyn Analyzer>,
        max_sentences: usize,
    ) -> Result<Self> {
        let parser = TrecParser::new()?;
        let documents = parser.parse_file(collection)?;
        Ok(Self::from_documents(documents, analyzer, max_sentences))
    }

    /// Summarize an already parsed set of documents.
    pub fn from_documents(
        documents: Vec<TrecDocument>,
        analyzer: Arc<dyn Analyzer>,
        max_sentences: usize,
    ) -> Self {
        let defaults = SummaryConfig::default();
        QueryBiasedSummarizer {
            documents: documents
                .into_iter()
                .map(|doc| (doc.doc_no.clone(), doc))
                .collect(),
            analyzer,
            max_sentences,
            similarity_threshold: defaults.similarity_threshold,
        }
    }

    /// Apply a [`SummaryConfig`].
    pub fn with_config(mut self, config: &SummaryConfig) -> Self {
        self.max_sentences = config.max_sentences;
        self.similarity_threshold = config.similarity_threshold;
        self
    }

    /// Number of documents available for summarization.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn sentences(&self, document: &TrecDocument) -> Result<Vec<Sentence>> {
        let headline = (!document.headline.is_empty()).then(|| document.headline.clone());
        headline
            .into_iter()
            .chain(
                document
                    .text
                    .unicode_sentences()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            )
            .map(|text| Sentence::new(text, self.analyzer.as_ref()))
            .collect()
    }
}

impl Summarizer for QueryBiasedSummarizer {
    fn summarize(&self, query_terms: &[String], doc_no: &str) -> Result<String> {
        let document = self
            .documents
            .get(doc_no)
            .ok_or_else(|| PilumError::query(format!("document '{doc_no}' not in collection")))?;

        let sentences = self.sentences(document)?;
        let query: AHashSet<&str> = query_terms.iter().map(String::as_str).collect();

        let centrality: Vec<usize> = sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                sentences
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| {
                        *j != i && sentence.cosine(other) >= self.similarity_threshold
                    })
                    .count()
            })
            .collect();
        let bias: Vec<f64> = sentences.iter().map(|s| s.query_bias(&query)).collect();

        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| {
            bias[b]
                .total_cmp(&bias[a])
                .then_with(|| centrality[b].cmp(&centrality[a]))
                .then_with(|| a.cmp(&b))
        });
        order.truncate(self.max_sentences);
        order.sort_unstable();

        debug!(
            "summary of {doc_no}: {} of {} sentences",
            order.len(),
            sentences.len()
        );

        Ok(order
            .into_iter()
            .map(|i| sentences[i].text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

impl std::fmt::Debug for QueryBiasedSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBiasedSummarizer")
            .field("documents", &self.documents.len())
            .field("analyzer", &self.analyzer.name())
            .field("max_sentences", &self.max_sentences)
            .field("similarity_threshold", &self.similarity_threshold)
            .finish()
    }
}
