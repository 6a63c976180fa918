//! 답변 구성 모듈
//!
//! 두 가지 모드:
//! - Local: 상위 N개 문서를 이어 붙여 글자 수 예산 안에서 요약 (네트워크 없음)
//! - Remote: 상위 N개 문서를 컨텍스트로 생성 서비스에 전달

use serde::{Deserialize, Serialize};

use crate::generation::Message;
use crate::knowledge::KnowledgeDocument;

/// 로컬 답변 헤더
const LOCAL_HEADER: &str = "Summary from local KB (demo mode)";

/// 생성 서비스 시스템 지시문
pub const SYSTEM_PROMPT: &str = "You are Anurag's portfolio assistant. Answer the user's question \
using ONLY the provided knowledge. If unknown, say you don't know. Return a concise answer \
(100-180 words) and include a short list of sources by title.";

// ============================================================================
// Configuration
// ============================================================================

/// 답변 구성 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// 컨텍스트로 사용할 상위 문서 수
    pub top_n: usize,
    /// 로컬 답변 본문 최대 글자 수
    pub char_budget: usize,
    /// 잘렸을 때 붙이는 표시
    pub ellipsis: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            top_n: 4,
            char_budget: 900,
            ellipsis: "...".to_string(),
        }
    }
}

// ============================================================================
// Answer
// ============================================================================

/// 답변 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    Local,
    Remote,
}

impl AnswerMode {
    pub fn label(&self) -> &'static str {
        match self {
            AnswerMode::Local => "Demo mode (local)",
            AnswerMode::Remote => "AI mode (OpenAI)",
        }
    }
}

/// 구성된 답변
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// 출처 문서 제목 (순위 순)
    pub sources: Vec<String>,
    pub mode: AnswerMode,
}

// ============================================================================
// Composer
// ============================================================================

/// 로컬 모드 답변 구성
///
/// 결정적이며 네트워크를 사용하지 않습니다.
pub fn compose_local(question: &str, top: &[&KnowledgeDocument], config: &ComposerConfig) -> Answer {
    let combined = top
        .iter()
        .enumerate()
        .map(|(i, d)| format!("({}) {}: {}", i + 1, d.title, d.content))
        .collect::<Vec<_>>()
        .join("\n");

    let body = truncate_chars(&combined, config.char_budget, &config.ellipsis);
    let sources = source_titles(top);

    let text = format!(
        "{}\n\nQ: {}\n\nA: {}\n\nSources: {}",
        LOCAL_HEADER,
        question,
        body,
        sources.join(", ")
    );

    Answer {
        text,
        sources,
        mode: AnswerMode::Local,
    }
}

/// 원격 모드 메시지 구성
///
/// 시스템 지시문 + (컨텍스트, 질문) 사용자 메시지
pub fn build_messages(question: &str, top: &[&KnowledgeDocument]) -> Vec<Message> {
    let context = top
        .iter()
        .enumerate()
        .map(|(i, d)| format!("# Source {}: {}\n{}", i + 1, d.title, d.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!("Context:\n{}\n\nQuestion: {}", context, question)),
    ]
}

/// 원격 모드 답변 (생성 결과를 그대로 사용)
pub fn remote_answer(text: String, top: &[&KnowledgeDocument]) -> Answer {
    Answer {
        text,
        sources: source_titles(top),
        mode: AnswerMode::Remote,
    }
}

fn source_titles(top: &[&KnowledgeDocument]) -> Vec<String> {
    top.iter().map(|d| d.title.clone()).collect()
}

/// 글자 수 기준 자르기 (UTF-8 안전)
fn truncate_chars(text: &str, max_chars: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ellipsis),
        None => text.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
