//! Query evaluation: similarity functions, accumulators and top-k selection.

pub mod accumulator;
pub mod collector;
pub mod engine;
pub mod similarity;

pub use self::collector::{RankedHit, RankedResult};
pub use self::engine::QueryEngine;
pub use self::similarity::{Bm25Similarity, Similarity, TermFrequencyRatio};
