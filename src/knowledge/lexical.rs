//! TF-IDF 스코어러 - 로컬 어휘 기반 랭킹
//!
//! 네트워크 없이 동작하는 폴백 랭킹입니다.
//!
//! score(doc) = Σ_q tf(q, doc) × idf(q)
//! - tf  = count(q, doc) / max(1, |doc|)
//! - idf = ln((N + corpus_offset) / (df + df_offset)), df 기본값 1

use std::collections::{HashMap, HashSet};

use crate::error::SmoothingError;

use super::document::{KnowledgeDocument, RankedResult};
use super::tokenizer::tokenize;

// ============================================================================
// Smoothing
// ============================================================================

/// IDF 스무딩 파라미터
///
/// `corpus_offset >= df_offset >= 0` 이어야 IDF가 음수가 되지 않습니다 (df <= N).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdfSmoothing {
    /// 문서 수 N에 더하는 값
    corpus_offset: f64,
    /// 문서 빈도 df에 더하는 값
    df_offset: f64,
}

impl Default for IdfSmoothing {
    fn default() -> Self {
        Self {
            corpus_offset: 1.0,
            df_offset: 0.5,
        }
    }
}

impl IdfSmoothing {
    /// 검증된 스무딩 파라미터 생성
    pub fn new(corpus_offset: f64, df_offset: f64) -> Result<Self, SmoothingError> {
        let valid = corpus_offset.is_finite()
            && df_offset.is_finite()
            && df_offset >= 0.0
            && corpus_offset >= df_offset;
        if !valid {
            return Err(SmoothingError {
                corpus_offset,
                df_offset,
            });
        }
        Ok(Self {
            corpus_offset,
            df_offset,
        })
    }

    pub fn corpus_offset(&self) -> f64 {
        self.corpus_offset
    }

    pub fn df_offset(&self) -> f64 {
        self.df_offset
    }

    /// 스무딩된 IDF 가중치
    ///
    /// `df`가 0이면 1로 취급합니다 (코퍼스에 없는 토큰).
    pub fn idf(&self, total_docs: usize, df: usize) -> f64 {
        let n = total_docs.max(1) as f64;
        let df = df.max(1) as f64;
        ((n + self.corpus_offset) / (df + self.df_offset)).ln().max(0.0)
    }
}

// ============================================================================
// TfIdfScorer
// ============================================================================

/// TF-IDF 스코어러
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfScorer {
    smoothing: IdfSmoothing,
}

impl TfIdfScorer {
    pub fn new(smoothing: IdfSmoothing) -> Self {
        Self { smoothing }
    }

    pub fn smoothing(&self) -> IdfSmoothing {
        self.smoothing
    }

    /// 쿼리와의 관련도로 문서를 정렬
    ///
    /// 스코어 내림차순, 동점은 원래 순서를 유지합니다.
    pub fn rank<'a>(&self, query: &str, docs: &'a [KnowledgeDocument]) -> Vec<RankedResult<'a>> {
        let query_tokens = tokenize(query);

        // 문서별 토큰 빈도 (제목 + 본문)
        let doc_counts: Vec<(HashMap<String, usize>, usize)> = docs
            .iter()
            .map(|d| {
                let tokens = tokenize(&format!("{} {}", d.title, d.content));
                let total = tokens.len();
                let mut counts = HashMap::new();
                for token in tokens {
                    *counts.entry(token).or_insert(0) += 1;
                }
                (counts, total)
            })
            .collect();

        // 문서 빈도 (쿼리 토큰만 필요)
        let unique_query: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
        let idf: HashMap<&str, f64> = unique_query
            .into_iter()
            .map(|token| {
                let df = doc_counts
                    .iter()
                    .filter(|(counts, _)| counts.contains_key(token))
                    .count();
                (token, self.smoothing.idf(docs.len(), df))
            })
            .collect();

        let mut results: Vec<RankedResult<'a>> = docs
            .iter()
            .zip(doc_counts.iter())
            .map(|(document, (counts, total))| {
                let denom = (*total).max(1) as f64;
                let score: f64 = query_tokens
                    .iter()
                    .map(|token| {
                        let tf = counts.get(token).copied().unwrap_or(0) as f64 / denom;
                        tf * idf.get(token.as_str()).copied().unwrap_or(0.0)
                    })
                    .sum();
                RankedResult { document, score }
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            "TF-IDF ranked {} documents for {} query tokens",
            results.len(),
            query_tokens.len()
        );

        results
    }
}

// ============================================================================
// Tests
// ============================================================================
