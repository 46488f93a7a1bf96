//! Standard analyzer: letter-run tokenizer, lowercasing, stop words.

use std::path::Path;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer};
use crate::error::Result;

/// Regex tokenizer followed by a lowercase filter and an optional stop
/// filter.
#[derive(Clone)]
pub struct StandardAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
}

impl StandardAnalyzer {
    /// Create an analyzer with the default English stop words.
    pub fn new() -> Result<Self> {
        Ok(Self::without_stop_words()?.with_stop_filter(StopFilter::new()))
    }

    /// Create an analyzer that keeps every term.
    pub fn without_stop_words() -> Result<Self> {
        Ok(StandardAnalyzer {
            tokenizer: Arc::new(RegexTokenizer::new()?),
            filters: vec![Arc::new(LowercaseFilter::new())],
        })
    }

    /// Create an analyzer whose stop words are read from a stoplist file.
    pub fn with_stoplist<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::without_stop_words()?.with_stop_filter(StopFilter::from_file(path)?))
    }

    /// Append a stop filter to the chain.
    pub fn with_stop_filter(mut self, filter: StopFilter) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Names of the filters in application order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }
        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

impl std::fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &self.filter_names())
            .finish()
    }
}
