use super::bm25::Bm25Index;
use super::fusion::{deduplicate_results, linear_fusion, reciprocal_rank_fusion};
use crate::config::{Bm25Config, Config, FusionConfig, FusionStrategy};
use crate::types::{Document, IndexStats, RankedHit, ScoredResult, Signal};
use std::collections::HashMap;
use tracing::debug;

/// Keyword index plus document store, fusing BM25 candidates with
/// externally computed vector, sparse and late-interaction rankings.
///
/// Every call is synchronous and never fails: empty queries, empty corpora
/// and unknown ids all produce empty or no-op results.
#[derive(Debug, Clone)]
pub struct HybridSearchEngine {
    index: Bm25Index,
    documents: HashMap<String, Document>,
    fusion: FusionConfig,
}

impl HybridSearchEngine {
    pub fn new(bm25: Bm25Config, fusion: FusionConfig) -> Self {
        Self {
            index: Bm25Index::with_params(bm25),
            documents: HashMap::new(),
            fusion,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bm25, config.fusion.clone())
    }

    /// Build an engine pre-loaded with `documents`.
    pub fn from_documents<I>(documents: I, bm25: Bm25Config, fusion: FusionConfig) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let mut engine = Self::new(bm25, fusion);
        engine.add_documents(documents);
        engine
    }

    pub fn fusion_config(&self) -> &FusionConfig {
        &self.fusion
    }

    pub fn bm25_params(&self) -> Bm25Config {
        self.index.params()
    }

    /// Index documents. An id that is already present is replaced.
    pub fn add_documents<I>(&mut self, documents: I)
    where
        I: IntoIterator<Item = Document>,
    {
        for doc in documents {
            self.index.add_document(&doc.id, &doc.content);
            self.documents.insert(doc.id.clone(), doc);
        }
    }

    /// Remove documents by id, returning how many were actually present.
    pub fn remove_documents<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let mut removed = 0;
        for id in ids {
            let id = id.as_ref();
            if self.documents.remove(id).is_some() {
                removed += 1;
            }
            self.index.remove_document(id);
        }
        removed
    }

    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_document(&self, id: &str) -> bool {
        self.index.has_document(id)
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.documents.clear();
    }

    /// BM25-only search, each hit tagged with the `keyword` source.
    pub fn keyword_search(&self, query: &str, top_k: usize) -> Vec<ScoredResult> {
        self.index
            .search(query, top_k)
            .into_iter()
            .map(|RankedHit { id, score }| {
                let mut result = ScoredResult::new(id, score);
                result.record_signal(Signal::Keyword, score);
                result.content = self.content_of(&result.id);
                result
            })
            .collect()
    }

    /// Fuse BM25 candidates for `query` with caller-supplied rankings.
    ///
    /// `vector_results`, `sparse_results` and `late_results` must already be
    /// sorted best-first; their raw score scales may differ. Each output
    /// carries the fused score, the signals that ranked it and the raw score
    /// each of those signals gave it.
    pub fn hybrid_search(
        &self,
        vector_results: &[RankedHit],
        query: &str,
        top_k: usize,
        sparse_results: Option<&[RankedHit]>,
        late_results: Option<&[RankedHit]>,
    ) -> Vec<ScoredResult> {
        if top_k == 0 {
            return Vec::new();
        }

        let candidate_count = top_k
            .saturating_mul(self.fusion.keyword_candidate_factor)
            .max(top_k);
        let keyword_hits = self.index.search(query, candidate_count);

        let mut signals: Vec<(Signal, f32, &[RankedHit])> = vec![
            (Signal::Vector, self.fusion.vector_weight, vector_results),
            (Signal::Keyword, self.fusion.keyword_weight, keyword_hits.as_slice()),
        ];
        if let Some(sparse) = sparse_results {
            signals.push((Signal::Sparse, self.fusion.sparse_weight_or_default(), sparse));
        }
        if let Some(late) = late_results {
            signals.push((Signal::Late, self.fusion.late_weight_or_default(), late));
        }

        let lists: Vec<&[RankedHit]> = signals.iter().map(|(_, _, list)| *list).collect();
        let weights: Vec<f32> = signals.iter().map(|(_, weight, _)| *weight).collect();

        let fused = match self.fusion.strategy {
            FusionStrategy::Rrf => {
                reciprocal_rank_fusion(&lists, Some(weights.as_slice()), self.fusion.rrf_k)
            }
            FusionStrategy::Linear => linear_fusion(&lists, Some(weights.as_slice())),
        };

        // Raw score of each id at its best rank, per signal
        let raw_scores: Vec<(Signal, HashMap<&str, f32>)> = signals
            .iter()
            .map(|(signal, _, list)| {
                let mut scores = HashMap::new();
                for hit in list.iter() {
                    scores.entry(hit.id.as_str()).or_insert(hit.score);
                }
                (*signal, scores)
            })
            .collect();

        let results: Vec<ScoredResult> = fused
            .into_iter()
            .map(|RankedHit { id, score }| {
                let mut result = ScoredResult::new(id, score);
                for (signal, scores) in &raw_scores {
                    if let Some(&raw) = scores.get(result.id.as_str()) {
                        result.record_signal(*signal, raw);
                    }
                }
                result.content = self.content_of(&result.id);
                result
            })
            .collect();

        let mut results = deduplicate_results(results);
        results.truncate(top_k);

        let signal_names: Vec<String> = signals
            .iter()
            .map(|(signal, _, _)| signal.to_string())
            .collect();
        debug!(
            "[HYBRID] Fused {} ({:?}), {} keyword candidates, returning {} results",
            signal_names.join("+"),
            self.fusion.strategy,
            keyword_hits.len(),
            results.len()
        );

        results
    }

    fn content_of(&self, id: &str) -> Option<String> {
        self.documents.get(id).map(|doc| doc.content.clone())
    }
}

impl Default for HybridSearchEngine {
    fn default() -> Self {
        Self::new(Bm25Config::default(), FusionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(pairs: &[(&str, f32)]) -> Vec<RankedHit> {
        pairs.iter().map(|(id, s)| RankedHit::new(*id, *s)).collect()
    }

    fn sample_engine() -> HybridSearchEngine {
        HybridSearchEngine::from_documents(
            vec![
                Document::new("doc1", "The quick brown fox jumps over the lazy dog"),
                Document::new("doc2", "A quick brown dog runs in the park"),
                Document::new("doc3", "The cat sleeps on the mat"),
            ],
            Bm25Config::default(),
            FusionConfig::default(),
        )
    }

    #[test]
    fn test_hybrid_single_document() {
        let mut engine = HybridSearchEngine::default();
        engine.add_documents(vec![Document::new("doc1", "Machine learning algorithms")]);

        let vector_results = hits(&[("doc1", 0.9)]);
        let results = engine.hybrid_search(&vector_results, "machine learning", 5, None, None);

        assert_eq!(results.len(), 1);
        let top = &results[0];
        assert_eq!(top.id, "doc1");
        assert!(top.score > 0.0);
        assert!(top.has_source(Signal::Vector));
        assert!(top.has_source(Signal::Keyword));
        assert_eq!(top.vector_score, Some(0.9));
        assert!(top.keyword_score.is_some());
        assert_eq!(top.content.as_deref(), Some("Machine learning algorithms"));
    }

    #[test]
    fn test_keyword_search_tags_source() {
        let engine = sample_engine();
        let results = engine.keyword_search("quick brown", 5);

        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.sources, vec![Signal::Keyword]);
            assert_eq!(result.keyword_score, Some(result.score));
            assert!(result.content.is_some());
        }
        assert!(engine.keyword_search("elephant zebra", 5).is_empty());
    }

    #[test]
    fn test_hybrid_top_k_zero() {
        let engine = sample_engine();
        let vector_results = hits(&[("doc1", 0.9)]);
        assert!(engine.hybrid_search(&vector_results, "quick", 0, None, None).is_empty());
    }

    #[test]
    fn test_hybrid_unions_signals() {
        let engine = sample_engine();
        // doc3 only comes from the vector side, doc2 only from keywords
        let vector_results = hits(&[("doc3", 0.8), ("doc1", 0.6)]);
        let results = engine.hybrid_search(&vector_results, "park", 10, None, None);

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"doc1"));
        assert!(ids.contains(&"doc2"));
        assert!(ids.contains(&"doc3"));

        let doc2 = results.iter().find(|r| r.id == "doc2").unwrap();
        assert_eq!(doc2.sources, vec![Signal::Keyword]);
        assert!(doc2.vector_score.is_none());

        let doc3 = results.iter().find(|r| r.id == "doc3").unwrap();
        assert_eq!(doc3.sources, vec![Signal::Vector]);
        assert!(doc3.keyword_score.is_none());
    }

    #[test]
    fn test_hybrid_carries_sparse_and_late_scores() {
        let engine = sample_engine();
        let vector_results = hits(&[("doc1", 0.9)]);
        let sparse_results = hits(&[("doc2", 14.0), ("doc1", 7.5)]);
        let late_results = hits(&[("doc1", 0.42)]);

        let results = engine.hybrid_search(
            &vector_results,
            "quick",
            5,
            Some(sparse_results.as_slice()),
            Some(late_results.as_slice()),
        );

        let doc1 = results.iter().find(|r| r.id == "doc1").unwrap();
        assert_eq!(
            doc1.sources,
            vec![Signal::Vector, Signal::Keyword, Signal::Sparse, Signal::Late]
        );
        assert_eq!(doc1.sparse_score, Some(7.5));
        assert_eq!(doc1.late_interaction_score, Some(0.42));
        // doc1 is ranked by every signal, so it leads
        assert_eq!(results[0].id, "doc1");

        let doc2 = results.iter().find(|r| r.id == "doc2").unwrap();
        assert_eq!(doc2.sparse_score, Some(14.0));
        assert!(doc2.late_interaction_score.is_none());
    }

    #[test]
    fn test_hybrid_weights_shift_ranking() {
        let docs = vec![
            Document::new("semantic", "completely unrelated wording"),
            Document::new("lexical", "tokio runtime internals"),
        ];
        let vector_results = hits(&[("semantic", 0.95)]);

        let vector_heavy = HybridSearchEngine::from_documents(
            docs.clone(),
            Bm25Config::default(),
            FusionConfig {
                vector_weight: 0.9,
                keyword_weight: 0.1,
                ..FusionConfig::default()
            },
        );
        let keyword_heavy = HybridSearchEngine::from_documents(
            docs,
            Bm25Config::default(),
            FusionConfig {
                vector_weight: 0.1,
                keyword_weight: 0.9,
                ..FusionConfig::default()
            },
        );

        let a = vector_heavy.hybrid_search(&vector_results, "tokio runtime", 5, None, None);
        let b = keyword_heavy.hybrid_search(&vector_results, "tokio runtime", 5, None, None);
        assert_eq!(a[0].id, "semantic");
        assert_eq!(b[0].id, "lexical");
    }

    #[test]
    fn test_keyword_candidate_pool_reaches_past_top_k() {
        let docs = vec![
            Document::new("strong", "tokio tokio tokio runtime"),
            Document::new("weak", "tokio scheduler notes among several other unrelated words"),
            Document::new("semantic", "completely different wording"),
        ];
        // "weak" is only second for BM25 but also ranked by the vector side
        let vector_results = hits(&[("semantic", 0.9), ("weak", 0.8)]);
        let engine_with_factor = |factor: usize| {
            HybridSearchEngine::from_documents(
                docs.clone(),
                Bm25Config::default(),
                FusionConfig {
                    keyword_candidate_factor: factor,
                    ..FusionConfig::default()
                },
            )
        };

        let pooled = engine_with_factor(3).hybrid_search(&vector_results, "tokio", 1, None, None);
        assert_eq!(pooled.len(), 1);
        assert_eq!(pooled[0].id, "weak");
        assert!(pooled[0].has_source(Signal::Keyword));

        let narrow = engine_with_factor(1).hybrid_search(&vector_results, "tokio", 1, None, None);
        assert_ne!(narrow[0].id, "weak");
    }

    #[test]
    fn test_hybrid_linear_strategy() {
        let engine = HybridSearchEngine::from_documents(
            vec![
                Document::new("a", "rust borrow checker"),
                Document::new("b", "garbage collected runtime"),
            ],
            Bm25Config::default(),
            FusionConfig {
                strategy: FusionStrategy::Linear,
                ..FusionConfig::default()
            },
        );

        let vector_results = hits(&[("a", 0.7), ("b", 0.2)]);
        let results = engine.hybrid_search(&vector_results, "borrow checker", 5, None, None);

        assert_eq!(results[0].id, "a");
        // Normalized vector (1.0) and keyword (1.0) halves
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert_eq!(results[1].id, "b");
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn test_hybrid_unknown_vector_id_has_no_content() {
        let engine = sample_engine();
        let vector_results = hits(&[("external", 0.99)]);
        let results = engine.hybrid_search(&vector_results, "zebra", 5, None, None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "external");
        assert!(results[0].content.is_none());
    }

    #[test]
    fn test_hybrid_duplicate_vector_entries_collapse() {
        let engine = sample_engine();
        let vector_results = hits(&[("doc3", 0.9), ("doc3", 0.4)]);
        let results = engine.hybrid_search(&vector_results, "zebra", 5, None, None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].vector_score, Some(0.9));
    }

    #[test]
    fn test_hybrid_truncates_to_top_k() {
        let engine = sample_engine();
        let vector_results = hits(&[("doc3", 0.9), ("doc2", 0.8), ("doc1", 0.7)]);
        let results = engine.hybrid_search(&vector_results, "quick brown", 2, None, None);
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_document_management() {
        let mut engine = sample_engine();
        assert_eq!(engine.size(), 3);
        assert!(engine.has_document("doc2"));

        assert_eq!(engine.remove_documents(&["doc2", "missing"]), 1);
        assert_eq!(engine.remove_documents(&["doc2"]), 0);
        assert_eq!(engine.size(), 2);
        assert!(!engine.has_document("doc2"));
        assert!(engine.get_document("doc2").is_none());

        engine.add_documents(vec![Document::new("doc1", "entirely new text")]);
        assert_eq!(engine.size(), 2);
        assert!(engine.keyword_search("fox", 5).is_empty());
        assert_eq!(
            engine.get_document("doc1").map(|d| d.content.as_str()),
            Some("entirely new text")
        );
    }

    #[test]
    fn test_clear_resets_index_and_store() {
        let mut engine = sample_engine();
        engine.clear();

        assert_eq!(engine.size(), 0);
        assert!(engine.is_empty());
        assert!(engine.get_document("doc1").is_none());
        assert!(engine.keyword_search("quick", 5).is_empty());
    }
}
