//! 임베딩 모듈 - OpenAI Embeddings API를 통한 텍스트 벡터화
//!
//! 쿼리와 모든 문서를 한 번의 배치 요청으로 벡터화합니다.
//! 성공이 아닌 응답은 해당 호출의 치명적 에러이며, 재시도하지 않습니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let embedder = OpenAiEmbedding::new(api_key, "https://api.openai.com", "text-embedding-3-small")?;
//! let vectors = embedder.embed_batch(&["hello".to_string()]).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::service_endpoint;
use crate::error::RemoteError;

// ============================================================================
// EmbeddingProvider Trait
// ============================================================================

/// 임베딩 프로바이더 트레이트
///
/// 텍스트를 벡터로 변환하는 인터페이스입니다.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// 배치 임베딩 (입력과 같은 순서로 반환)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError>;

    /// 단일 텍스트 임베딩
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RemoteError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| RemoteError::Decode {
                service: "embedding",
                message: "empty embedding response".to_string(),
            })
    }

    /// 프로바이더 이름
    fn name(&self) -> &str;
}

// ============================================================================
// OpenAI Embedding
// ============================================================================

/// 기본 임베딩 모델
/// source: https://platform.openai.com/docs/models/text-embedding-3-small
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// 요청 타임아웃
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SERVICE: &str = "embedding";

/// OpenAI 임베딩 구현체
///
/// source: https://platform.openai.com/docs/guides/embeddings
#[derive(Debug)]
pub struct OpenAiEmbedding {
    api_key: String,
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl OpenAiEmbedding {
    /// 새 임베딩 클라이언트 생성
    ///
    /// # Arguments
    /// * `api_key` - API 키 (Bearer 인증)
    /// * `base_url` - 서비스 기본 URL (예: https://api.openai.com)
    /// * `model` - 임베딩 모델 ID
    pub fn new(
        api_key: String,
        base_url: &str,
        model: impl Into<String>,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| RemoteError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            api_key,
            client,
            endpoint: service_endpoint(base_url, "v1/embeddings")?,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Embeddings API 요청 본문
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

/// Embeddings API 응답
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
        let request = EmbedRequest {
            input: texts,
            model: &self.model,
        };

        tracing::debug!("Embedding {} inputs with {}", texts.len(), self.model);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RemoteError::Transport {
                service: SERVICE,
                source,
            })?;

        if !status.is_success() {
            tracing::warn!("Embedding request failed with status {}", status);
            return Err(RemoteError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let mut parsed: EmbedResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        // index가 있으면 입력 순서로 정렬
        if parsed.data.iter().all(|d| d.index.is_some()) {
            parsed.data.sort_by_key(|d| d.index);
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================
