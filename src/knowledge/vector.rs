//! 벡터 유사도 - 임베딩 기반 랭킹 유틸리티
//!
//! 코사인 유사도로 쿼리 벡터와 문서 벡터를 비교합니다.

use crate::error::RankError;

use super::document::{KnowledgeDocument, RankedResult};

/// 0 벡터일 때 0으로 나누는 것을 막기 위한 값
pub const COSINE_EPSILON: f64 = 1e-8;

/// 코사인 유사도 계산
///
/// dot(a, b) / (|a| × |b| + ε)
///
/// 길이가 다르면 짧은 쪽 길이까지만 계산합니다.
/// 결과는 대략 -1.0 ~ 1.0 범위입니다. 무한대 성분으로 NaN이 되면 0.0을 반환합니다.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt() + COSINE_EPSILON);
    if score.is_nan() {
        0.0
    } else {
        score
    }
}

/// 문서 벡터를 쿼리 벡터와의 유사도로 정렬
///
/// `doc_vectors`는 `docs`와 같은 순서, 같은 개수여야 합니다.
pub fn rank_by_similarity<'a>(
    query_vector: &[f32],
    doc_vectors: &[Vec<f32>],
    docs: &'a [KnowledgeDocument],
) -> Result<Vec<RankedResult<'a>>, RankError> {
    if doc_vectors.len() != docs.len() {
        return Err(RankError::DimensionMismatch {
            expected: docs.len(),
            actual: doc_vectors.len(),
        });
    }

    let mut results: Vec<RankedResult<'a>> = docs
        .iter()
        .zip(doc_vectors.iter())
        .map(|(document, vector)| RankedResult {
            document,
            score: cosine_similarity(query_vector, vector),
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(results)
}

// ============================================================================
// Tests
// ============================================================================
