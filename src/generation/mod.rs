//! 생성 모듈 - OpenAI Responses API를 통한 답변 생성
//!
//! 역할 태그가 붙은 메시지 목록을 보내고 자유 텍스트 답변을 받습니다.
//! 응답은 여러 형태로 올 수 있으므로 `ResponseEnvelope`로 명시적으로 디코딩합니다.
//!
//! source: https://platform.openai.com/docs/api-reference/responses

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::service_endpoint;
use crate::error::RemoteError;

/// 기본 생성 모델
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-5";

/// 요청 타임아웃 (생성은 임베딩보다 오래 걸림)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SERVICE: &str = "generation";

// ============================================================================
// Messages
// ============================================================================

/// 메시지 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 역할 태그 메시지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

/// 생성 응답 형태
///
/// 알려진 형태마다 하나의 분기, 그리고 명시적 폴백 분기를 가집니다.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// `{"output_text": "..."}`
    OutputText(String),
    /// `{"output": [{"content": [{"text": "..."}]}]}`
    ContentArray(String),
    /// 알 수 없는 형태 (원본 JSON)
    Raw(Value),
}

impl ResponseEnvelope {
    /// 응답 JSON 디코딩
    ///
    /// OutputText → ContentArray → Raw 순으로 시도합니다.
    /// 빈 문자열은 없는 것으로 취급합니다.
    pub fn decode(value: Value) -> Self {
        if let Some(text) = value
            .get("output_text")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        {
            return Self::OutputText(text.to_string());
        }

        let nested = value
            .get("output")
            .and_then(|o| o.get(0))
            .and_then(|o| o.get("content"))
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        if let Some(text) = nested {
            return Self::ContentArray(text.to_string());
        }

        Self::Raw(value)
    }

    /// 답변 텍스트로 변환
    pub fn into_text(self) -> String {
        match self {
            Self::OutputText(text) | Self::ContentArray(text) => text,
            Self::Raw(value) => value.to_string(),
        }
    }
}

// ============================================================================
// GenerationProvider Trait
// ============================================================================

/// 텍스트 생성 프로바이더 트레이트
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// 메시지 목록으로 답변 생성
    async fn generate(&self, messages: &[Message]) -> Result<String, RemoteError>;

    /// 프로바이더 이름
    fn name(&self) -> &str;
}

// ============================================================================
// OpenAI Responses
// ============================================================================

/// OpenAI Responses API 구현체
#[derive(Debug)]
pub struct OpenAiResponses {
    api_key: String,
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl OpenAiResponses {
    /// 새 생성 클라이언트 생성
    ///
    /// # Arguments
    /// * `api_key` - API 키 (Bearer 인증)
    /// * `base_url` - 서비스 기본 URL
    /// * `model` - 생성 모델 ID
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
            endpoint: service_endpoint(base_url, "v1/responses")?,
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    input: &'a [Message],
}

#[async_trait]
impl GenerationProvider for OpenAiResponses {
    async fn generate(&self, messages: &[Message]) -> Result<String, RemoteError> {
        let request = GenerateRequest {
            model: &self.model,
            input: messages,
        };

        tracing::debug!(
            "Generating answer with {} ({} messages)",
            self.model,
            messages.len()
        );

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
            tracing::warn!("Generation request failed with status {}", status);
            return Err(RemoteError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        let envelope = ResponseEnvelope::decode(value);
        if matches!(envelope, ResponseEnvelope::Raw(_)) {
            tracing::warn!("Unrecognized generation response shape, returning raw JSON");
        }

        Ok(envelope.into_text())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================
