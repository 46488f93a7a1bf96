//! Analyzers combine a tokenizer with a filter chain.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod standard;

pub use self::standard::StandardAnalyzer;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analyzers are shared between the indexer and concurrently running
/// queries, hence `Send + Sync`.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze `text` and keep only the term texts, in order.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl std::fmt::Debug for dyn Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Analyzer({})", self.name())
    }
}
