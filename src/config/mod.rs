//! 설정 모듈
//!
//! 원격 모드 토글, API 키, 서비스 URL/모델, 답변 구성 파라미터, IDF 스무딩을 담습니다.
//! 환경변수에서 읽고, CLI 플래그가 이를 덮어씁니다.

use anyhow::{Context, Result};
use url::Url;

use crate::answer::ComposerConfig;
use crate::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::generation::DEFAULT_GENERATION_MODEL;
use crate::knowledge::IdfSmoothing;

/// 기본 서비스 URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// API 키 환경변수
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// 서비스 URL 환경변수
pub const BASE_URL_ENV: &str = "ASK_ANURAG_BASE_URL";
/// 임베딩 모델 환경변수
pub const EMBEDDING_MODEL_ENV: &str = "ASK_ANURAG_EMBEDDING_MODEL";
/// 생성 모델 환경변수
pub const GENERATION_MODEL_ENV: &str = "ASK_ANURAG_GENERATION_MODEL";

// ============================================================================
// AskConfig
// ============================================================================

/// 전체 설정
#[derive(Debug, Clone)]
pub struct AskConfig {
    /// 원격 (임베딩 + 생성) 모드 사용 여부
    pub remote_enabled: bool,
    /// 원격 서비스 API 키
    pub api_key: Option<String>,
    /// 서비스 기본 URL (검증됨)
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub composer: ComposerConfig,
    pub smoothing: IdfSmoothing,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            remote_enabled: false,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            composer: ComposerConfig::default(),
            smoothing: IdfSmoothing::default(),
        }
    }
}

impl AskConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로 설정 로드
    ///
    /// 빈 값은 설정되지 않은 것으로 취급합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = get(API_KEY_ENV);

        if let Some(url) = get(BASE_URL_ENV) {
            config.base_url = parse_base_url(&url)?.to_string();
        }
        if let Some(model) = get(EMBEDDING_MODEL_ENV) {
            config.embedding_model = model;
        }
        if let Some(model) = get(GENERATION_MODEL_ENV) {
            config.generation_model = model;
        }

        Ok(config)
    }

    /// 원격 모드가 실제로 활성화되었는지 (토글 + 자격 증명)
    pub fn remote_active(&self) -> bool {
        self.remote_enabled && self.api_key.is_some()
    }
}

/// 기본 URL 파싱 (http/https만 허용)
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid base URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Base URL must use http or https: {}", raw);
    }
    Ok(url)
}

/// 기본 URL에 API 경로를 붙여 엔드포인트 생성
///
/// 기본 URL의 경로는 유지됩니다 (예: `https://proxy.local/openai` + `v1/embeddings`).
/// 기본 URL이 이미 버전 세그먼트(`/v1`)로 끝나면 `path`의 버전 부분은 생략하고,
/// 전체 엔드포인트 경로로 끝나면 그대로 사용합니다.
pub fn service_endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    let path = path.trim_start_matches('/');
    let base_path = base.path().trim_end_matches('/').to_string();

    if base_path.ends_with(&format!("/{}", path)) {
        base.set_path(&base_path);
        return Ok(base);
    }

    let path = match path.split_once('/') {
        Some((version, rest)) if is_version_segment(version) && has_version_suffix(&base_path) => {
            rest
        }
        _ => path,
    };

    base.set_path(&format!("{}/", base_path));
    base.join(path)
}

/// 경로의 마지막 세그먼트가 `v<숫자>` 형태인지
fn has_version_suffix(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(is_version_segment)
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AskConfig::default();
        assert!(!config.remote_enabled);
        assert!(!config.remote_active());
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.generation_model, "gpt-5");
        assert_eq!(config.composer.top_n, 4);
        assert_eq!(config.composer.char_budget, 900);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AskConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "sk-test"),
            (BASE_URL_ENV, "http://localhost:8080/proxy"),
            (GENERATION_MODEL_ENV, "gpt-4o-mini"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url, "http://localhost:8080/proxy");
        assert_eq!(config.generation_model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
    }

    #[test]
    fn test_empty_key_is_unset() {
        let config = AskConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_remote_requires_key_and_toggle() {
        let mut config = AskConfig::default();
        config.remote_enabled = true;
        assert!(!config.remote_active());

        config.api_key = Some("sk-test".to_string());
        assert!(config.remote_active());

        config.remote_enabled = false;
        assert!(!config.remote_active());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(AskConfig::from_lookup(lookup_from(&[(BASE_URL_ENV, "::")])).is_err());
    }

    #[test]
    fn test_service_endpoint() {
        assert_eq!(
            service_endpoint("https://api.openai.com", "v1/responses")
                .unwrap()
                .as_str(),
            "https://api.openai.com/v1/responses"
        );
        assert_eq!(
            service_endpoint("https://proxy.local/openai", "/v1/embeddings")
                .unwrap()
                .as_str(),
            "https://proxy.local/openai/v1/embeddings"
        );
        assert!(service_endpoint("not a url", "v1/responses").is_err());
    }

    #[test]
    fn test_service_endpoint_versioned_base() {
        for base in ["https://api.openai.com/v1", "https://api.openai.com/v1/"] {
            assert_eq!(
                service_endpoint(base, "v1/embeddings").unwrap().as_str(),
                "https://api.openai.com/v1/embeddings"
            );
            assert_eq!(
                service_endpoint(base, "v1/responses").unwrap().as_str(),
                "https://api.openai.com/v1/responses"
            );
        }
        assert_eq!(
            service_endpoint("http://localhost:8080/proxy/v2", "v1/embeddings")
                .unwrap()
                .as_str(),
            "http://localhost:8080/proxy/v2/embeddings"
        );
    }

    #[test]
    fn test_service_endpoint_full_path_base() {
        assert_eq!(
            service_endpoint("https://api.openai.com/v1/embeddings", "v1/embeddings")
                .unwrap()
                .as_str(),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(
            service_endpoint("https://gw.local/openai/v1/responses/", "v1/responses")
                .unwrap()
                .as_str(),
            "https://gw.local/openai/v1/responses"
        );
    }
}
