//! Collection ingestion: parse a TREC file, index it, write the stores.

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::analysis::analyzer::Analyzer;
use crate::config::IndexConfig;
use crate::error::Result;
use crate::index::builder::{BuiltIndex, IndexBuilder};
use crate::storage::Storage;

pub mod indexer;
pub mod trec;

pub use self::indexer::DocumentIndexer;
pub use self::trec::{TrecDocument, TrecParser};

/// Parse `collection`, index every document and build the index in `storage`.
pub fn index_collection<P: AsRef<Path>>(
    collection: P,
    storage: Arc<dyn Storage>,
    config: &IndexConfig,
    analyzer: Arc<dyn Analyzer>,
) -> Result<BuiltIndex> {
    let builder = IndexBuilder::new(storage, config.clone())?;

    let parser = TrecParser::new()?;
    let documents = parser.parse_file(collection.as_ref())?;
    info!(
        "Parsed {} documents from {}",
        documents.len(),
        collection.as_ref().display()
    );

    let mut indexer = DocumentIndexer::new(analyzer, config);
    for document in &documents {
        indexer.add_document(&document.doc_no, &document.content())?;
    }

    let (lexicon, catalog, stats) = indexer.finish()?;
    builder.with_stats(stats).build(&lexicon, &catalog)
}
