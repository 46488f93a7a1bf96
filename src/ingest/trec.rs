//! TREC collection parsing.
//!
//! A collection file is a sequence of SGML-like blocks:
//!
//! ```text
//! <DOC>
//! <DOCNO> LA010189-0001 </DOCNO>
//! <HEADLINE><P>Headline text</P></HEADLINE>
//! <TEXT><P>First paragraph.</P><P>Second paragraph.</P></TEXT>
//! </DOC>
//! ```
//!
//! Only `DOCNO`, `HEADLINE` and `TEXT` are kept; every other element is
//! skipped and markup inside the kept elements is replaced by whitespace.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};

/// One document of a TREC collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrecDocument {
    /// External document number.
    pub doc_no: String,
    /// Headline with markup removed; empty when the document has none.
    pub headline: String,
    /// Body text with markup removed.
    pub text: String,
}

impl TrecDocument {
    /// Headline and text joined, as indexed.
    pub fn content(&self) -> String {
        match (self.headline.is_empty(), self.text.is_empty()) {
            (true, _) => self.text.clone(),
            (false, true) => self.headline.clone(),
            (false, false) => format!("{} {}", self.headline, self.text),
        }
    }
}

/// Parser for TREC `<DOC>` blocks.
#[derive(Debug, Clone)]
pub struct TrecParser {
    doc: Regex,
    doc_no: Regex,
    headline: Regex,
    text: Regex,
    markup: Regex,
    whitespace: Regex,
}

impl TrecParser {
    /// Compile the document and field patterns.
    pub fn new() -> Result<Self> {
        Ok(TrecParser {
            doc: compile(r"(?s)<DOC>(.*?)</DOC>")?,
            doc_no: compile(r"(?s)<DOCNO>(.*?)</DOCNO>")?,
            headline: compile(r"(?s)<HEADLINE>(.*?)</HEADLINE>")?,
            text: compile(r"(?s)<TEXT>(.*?)</TEXT>")?,
            markup: compile(r"<[^>]*>")?,
            whitespace: compile(r"\s+")?,
        })
    }

    /// Parse every document of a collection, in file order.
    ///
    /// A block without a `DOCNO` fails the whole parse with an error naming
    /// the block's 1-based ordinal.
    pub fn parse(&self, content: &str) -> Result<Vec<TrecDocument>> {
        self.doc
            .captures_iter(content)
            .enumerate()
            .map(|(i, cap)| self.parse_block(i + 1, &cap[1]))
            .collect()
    }

    /// Read and parse a collection file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<TrecDocument>> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PilumError::analysis(format!(
                "cannot read collection {}: {e}",
                path.as_ref().display()
            ))
        })?;
        self.parse(&content)
    }

    fn parse_block(&self, ordinal: usize, block: &str) -> Result<TrecDocument> {
        let doc_no = self
            .doc_no
            .captures(block)
            .map(|cap| cap[1].trim().to_string())
            .filter(|doc_no| !doc_no.is_empty())
            .ok_or_else(|| PilumError::analysis(format!("document #{ordinal} has no DOCNO")))?;

        Ok(TrecDocument {
            doc_no,
            headline: self.element_text(&self.headline, block),
            text: self.element_text(&self.text, block),
        })
    }

    /// Concatenated, markup-free contents of every occurrence of an element.
    fn element_text(&self, element: &Regex, block: &str) -> String {
        let joined = element
            .captures_iter(block)
            .map(|cap| self.markup.replace_all(&cap[1], " ").into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        self.whitespace.replace_all(joined.trim(), " ").into_owned()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PilumError::analysis(format!("Invalid regex pattern: {e}")))
}
