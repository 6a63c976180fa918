//! 관련도 랭커 - 로컬 TF-IDF 또는 원격 임베딩 선택
//!
//! 임베딩 경로의 실패는 그대로 전파됩니다.
//! 로컬 폴백은 호출자가 `rank_with_fallback`으로 명시적으로 선택할 때만 사용됩니다.

use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::error::RankError;

use super::document::{KnowledgeDocument, RankedResult};
use super::lexical::{IdfSmoothing, TfIdfScorer};
use super::vector::rank_by_similarity;

/// 랭킹 방법
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    /// 로컬 TF-IDF
    Lexical,
    /// 원격 임베딩 + 코사인 유사도
    Embedding,
}

/// 관련도 랭커
#[derive(Clone)]
pub struct Ranker {
    lexical: TfIdfScorer,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl Ranker {
    /// 로컬 전용 랭커
    pub fn lexical(smoothing: IdfSmoothing) -> Self {
        Self {
            lexical: TfIdfScorer::new(smoothing),
            embedder: None,
        }
    }

    /// 임베딩 프로바이더 연결 (임베딩 모드로 전환)
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn mode(&self) -> RankingMode {
        if self.embedder.is_some() {
            RankingMode::Embedding
        } else {
            RankingMode::Lexical
        }
    }

    /// 현재 모드로 랭킹
    pub async fn rank<'a>(
        &self,
        query: &str,
        docs: &'a [KnowledgeDocument],
    ) -> Result<Vec<RankedResult<'a>>, RankError> {
        match self.mode() {
            RankingMode::Lexical => Ok(self.rank_lexical(query, docs)),
            RankingMode::Embedding => self.rank_embedding(query, docs).await,
        }
    }

    /// TF-IDF 랭킹
    pub fn rank_lexical<'a>(
        &self,
        query: &str,
        docs: &'a [KnowledgeDocument],
    ) -> Vec<RankedResult<'a>> {
        self.lexical.rank(query, docs)
    }

    /// 임베딩 랭킹
    ///
    /// 쿼리와 모든 문서("title\ncontent")를 한 번의 배치 요청으로 보냅니다.
    pub async fn rank_embedding<'a>(
        &self,
        query: &str,
        docs: &'a [KnowledgeDocument],
    ) -> Result<Vec<RankedResult<'a>>, RankError> {
        let embedder = self.embedder.as_ref().ok_or(RankError::NoProvider)?;

        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<String> = std::iter::once(query.to_string())
            .chain(docs.iter().map(|d| format!("{}\n{}", d.title, d.content)))
            .collect();

        let vectors = embedder.embed_batch(&inputs).await?;
        if vectors.len() != inputs.len() {
            return Err(RankError::DimensionMismatch {
                expected: inputs.len(),
                actual: vectors.len(),
            });
        }

        let (query_vector, doc_vectors) = vectors.split_at(1);
        tracing::debug!(
            "Embedding ranked {} documents via {}",
            docs.len(),
            embedder.name()
        );

        rank_by_similarity(&query_vector[0], doc_vectors, docs)
    }

    /// 임베딩 실패 시 TF-IDF로 재시도
    ///
    /// 호출자가 명시적으로 선택하는 폴백입니다.
    pub async fn rank_with_fallback<'a>(
        &self,
        query: &str,
        docs: &'a [KnowledgeDocument],
    ) -> Vec<RankedResult<'a>> {
        match self.rank(query, docs).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Embedding ranking failed, using TF-IDF: {}", e);
                self.rank_lexical(query, docs)
            }
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::lexical(IdfSmoothing::default())
    }
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker")
            .field("mode", &self.mode())
            .field("smoothing", &self.lexical.smoothing())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use async_trait::async_trait;

    /// 텍스트에 특정 단어가 있으면 [1, 0], 아니면 [0, 1]
    struct KeywordEmbedder {
        keyword: &'static str,
    }

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.to_lowercase().contains(self.keyword) {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
            Err(RemoteError::Status {
                service: "embedding",
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct ShortEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ShortEmbedder {
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
            Ok(vec![vec![1.0]])
        }

        fn name(&self) -> &str {
            "short"
        }
    }

    fn docs() -> Vec<KnowledgeDocument> {
        vec![
            KnowledgeDocument::new("a", "Logistics Dashboard", "React Node PostgreSQL", &[]),
            KnowledgeDocument::new("b", "Mobile App", "Next.js Prisma MySQL", &[]),
        ]
    }

    #[tokio::test]
    async fn test_lexical_mode_by_default() {
        let ranker = Ranker::default();
        assert_eq!(ranker.mode(), RankingMode::Lexical);

        let docs = docs();
        let results = ranker.rank("React dashboard", &docs).await.unwrap();
        assert_eq!(results[0].document.id, "a");
    }

    #[tokio::test]
    async fn test_embedding_mode_uses_vectors() {
        let ranker = Ranker::default().with_embedder(Arc::new(KeywordEmbedder { keyword: "prisma" }));
        assert_eq!(ranker.mode(), RankingMode::Embedding);

        let docs = docs();
        // 쿼리에도 키워드가 있어야 문서 b와 같은 방향이 됨
        let results = ranker.rank("prisma orm", &docs).await.unwrap();
        assert_eq!(results[0].document.id, "b");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_not_silently_replaced() {
        let ranker = Ranker::default().with_embedder(Arc::new(FailingEmbedder));
        let docs = docs();

        let err = ranker.rank("React dashboard", &docs).await.unwrap_err();
        assert!(matches!(err, RankError::Embedding(RemoteError::Status { .. })));
    }

    #[tokio::test]
    async fn test_explicit_fallback_uses_lexical() {
        let ranker = Ranker::default().with_embedder(Arc::new(FailingEmbedder));
        let docs = docs();

        let results = ranker.rank_with_fallback("React dashboard", &docs).await;
        assert_eq!(results[0].document.id, "a");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch() {
        let ranker = Ranker::default().with_embedder(Arc::new(ShortEmbedder));
        let docs = docs();

        let err = ranker.rank("anything", &docs).await.unwrap_err();
        assert!(matches!(
            err,
            RankError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_embedding_empty_collection() {
        let ranker = Ranker::default().with_embedder(Arc::new(FailingEmbedder));
        let results = ranker.rank("anything", &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_rank_embedding_without_provider() {
        let ranker = Ranker::default();
        let docs = docs();
        let err = ranker.rank_embedding("anything", &docs).await.unwrap_err();
        assert!(matches!(err, RankError::NoProvider));
    }
}
