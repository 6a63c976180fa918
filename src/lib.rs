//! ask-anurag - 포트폴리오 지식베이스 Q&A
//!
//! 작은 메모리 내 지식베이스를 질문과의 관련도로 랭킹하고 답변을 구성합니다.
//! - 로컬 모드: TF-IDF 랭킹 + 글자 수 예산 내 요약
//! - 원격 모드: 임베딩 코사인 유사도 랭킹 + 생성 서비스 답변

pub mod answer;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod knowledge;
pub mod session;

// Re-exports
pub use answer::{build_messages, compose_local, Answer, AnswerMode, ComposerConfig};
pub use config::AskConfig;
pub use embedding::{EmbeddingProvider, OpenAiEmbedding};
pub use error::{ImportError, RankError, RemoteError, SmoothingError};
pub use generation::{GenerationProvider, Message, OpenAiResponses, ResponseEnvelope, Role};
pub use knowledge::{
    cosine_similarity, default_documents, tokenize, IdfSmoothing, KnowledgeBase,
    KnowledgeDocument, RankedResult, Ranker, RankingMode, TfIdfScorer,
};
pub use session::{AskOutcome, AskSession, AskState};
