//! Knowledge 모듈 - 메모리 내 지식베이스와 관련도 랭킹
//!
//! - Document: 지식 문서, 시드 세트, JSON 가져오기/내보내기
//! - Tokenizer: 소문자 영숫자 토큰화
//! - Lexical: 스무딩된 TF-IDF 스코어러 (로컬 폴백)
//! - Vector: 코사인 유사도
//! - Ranker: 로컬/임베딩 경로 선택

mod document;
mod lexical;
mod ranker;
mod tokenizer;
mod vector;

// Re-exports
pub use document::{
    default_documents, KnowledgeBase, KnowledgeDocument, RankedResult, SUGGESTED_QUESTIONS,
};
pub use lexical::{IdfSmoothing, TfIdfScorer};
pub use ranker::{Ranker, RankingMode};
pub use tokenizer::tokenize;
pub use vector::{cosine_similarity, rank_by_similarity, COSINE_EPSILON};
