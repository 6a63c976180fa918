//! 에러 타입
//!
//! 라이브러리 경계에서 구분이 필요한 실패를 타입으로 표현합니다.
//! - ImportError: 지식베이스 가져오기 실패 (컬렉션은 변경되지 않음)
//! - RemoteError: 임베딩/생성 서비스 실패
//! - RankError: 랭킹 실패
//! - SmoothingError: 잘못된 IDF 스무딩 파라미터

use thiserror::Error;

/// 지식베이스 JSON 가져오기 에러
#[derive(Debug, Error)]
pub enum ImportError {
    /// JSON 파싱 실패
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// 유효한 JSON이지만 배열이 아님
    #[error("Knowledge must be an array of {{id,title,content,tags}}")]
    NotAnArray,

    /// 배열 원소가 문서 형식과 맞지 않음
    #[error("Invalid entry at index {index}: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// 중복된 문서 ID
    #[error("Duplicate document id: {0}")]
    DuplicateId(String),

    /// 파일 읽기 실패
    #[error("Failed to read knowledge file: {0}")]
    Io(#[from] std::io::Error),
}

/// 원격 서비스 (임베딩/생성) 에러
#[derive(Debug, Error)]
pub enum RemoteError {
    /// 성공이 아닌 HTTP 응답
    #[error("{service} request failed ({status}): {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// 요청 전송 실패
    #[error("{service} request could not be sent: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// 응답 본문 디코딩 실패
    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// 엔드포인트 URL 구성 실패
    #[error("Invalid service URL: {0}")]
    Url(#[from] url::ParseError),
}

/// 랭킹 에러
#[derive(Debug, Error)]
pub enum RankError {
    #[error(transparent)]
    Embedding(#[from] RemoteError),

    /// 임베딩 개수가 입력 개수와 다름
    #[error("Expected {expected} embeddings, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// 원격 랭킹을 요청했지만 임베딩 프로바이더가 없음
    #[error("Embedding ranking requested but no provider is configured")]
    NoProvider,
}

/// IDF 스무딩 파라미터 검증 실패
#[derive(Debug, Error, PartialEq)]
#[error("Invalid IDF smoothing (corpus_offset={corpus_offset}, df_offset={df_offset}): need finite corpus_offset >= df_offset >= 0")]
pub struct SmoothingError {
    pub corpus_offset: f64,
    pub df_offset: f64,
}
