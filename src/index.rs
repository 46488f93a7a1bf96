//! On-disk inverted index.
//!
//! An index is four named files inside a [`Storage`](crate::storage::Storage):
//!
//! - the posting-list store ([`posting`]): fixed 8-byte `(doc_id, tf)` records
//! - the lexicon store ([`lexicon`]): term, document frequency, byte offset
//! - the document catalog ([`catalog`]): doc id to document number and norm
//! - the manifest ([`manifest`]): JSON summary with checksums
//!
//! [`builder::IndexBuilder`] writes all four; the query engine in
//! [`crate::search`] reads them back.

pub mod builder;
pub mod catalog;
pub mod lexicon;
pub mod manifest;
pub mod posting;

pub use builder::{BuiltIndex, CollectionStats, IndexBuilder, InvertedLexicon, StoreHandle};
pub use catalog::{CatalogEntry, DocumentCatalog};
pub use lexicon::{LexiconEntry, LexiconStore};
pub use manifest::{IndexManifest, ValidationReport};
pub use posting::{POSTING_SIZE, Posting};
