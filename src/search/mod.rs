//! Lexical and hybrid retrieval.
//!
//! - `bm25`: inverted index with Okapi BM25 scoring
//! - `fusion`: min-max normalization, weighted RRF, linear fusion, de-duplication
//! - `hybrid`: engine combining BM25 with caller-supplied vector/sparse/late rankings

pub mod bm25;
pub mod fusion;
pub mod hybrid;

pub use bm25::Bm25Index;
pub use fusion::{
    deduplicate_results, linear_fusion, normalize_scores, reciprocal_rank_fusion, RRF_K,
};
pub use hybrid::HybridSearchEngine;
