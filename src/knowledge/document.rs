//! Knowledge Base - 메모리 내 지식 문서 컬렉션
//!
//! 세션 동안 메모리에만 유지됩니다.
//! 시작 시 고정된 시드 세트로 생성되고, 사용자가 제공한 JSON으로 통째로 교체될 수 있습니다.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

// ============================================================================
// Types
// ============================================================================

/// 지식 문서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// 고유 식별자 (컬렉션 내 유일)
    pub id: String,
    /// 짧은 제목 (스코어링 텍스트에 포함, 출처로 표시)
    #[serde(default)]
    pub title: String,
    /// 본문
    pub content: String,
    /// 태그 (스코어링에 사용되지 않음)
    #[serde(default)]
    pub tags: Vec<String>,
}

impl KnowledgeDocument {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// 랭킹 결과
///
/// 스코어는 한 번의 랭킹 호출 안에서의 상대 순서만 의미가 있습니다.
#[derive(Debug, Clone, Copy)]
pub struct RankedResult<'a> {
    pub document: &'a KnowledgeDocument,
    pub score: f64,
}

/// 기본 시드 지식베이스
pub fn default_documents() -> Vec<KnowledgeDocument> {
    vec![
        KnowledgeDocument::new(
            "project-a",
            "Project A — Smart Logistics Dashboard",
            "Project A is a logistics analytics dashboard. Stack: React, TypeScript, Tailwind, \
             Node.js, PostgreSQL. Tools used: Jira, Confluence, Figma, Postman, GitHub Actions. \
             I owned requirements, UX flows, component library, API contracts, and real‑time charts.",
            &["React", "RAG", "Logistics", "Dashboard", "UX"],
        ),
        KnowledgeDocument::new(
            "project-b",
            "Project B — Mobile Ordering App",
            "Project B is a mobile web app for ordering building materials. Tech: Next.js, tRPC, \
             Prisma, MySQL. Tools used: Storybook, Playwright, Sentry, Vercel, Feature Flags. \
             I led accessibility, slot‑booking logic, and performance improvements.",
            &["Next.js", "A11y", "Performance", "Ordering"],
        ),
        KnowledgeDocument::new(
            "profile",
            "About Anurag",
            "I am a Requirements Engineer with strong UI/UX focus. Comfortable with React, \
             TypeScript, Tailwind, design systems, test automation, API design, and analytics. \
             Experience collaborating with PO, UX, and Dev in Scrum.",
            &["Requirements", "React", "TypeScript", "UX"],
        ),
    ]
}

/// 추천 질문 목록
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "What software tools did you use on Project A?",
    "What was your role in Project B?",
    "Summarize your frontend stack.",
    "Which testing tools have you used?",
];

// ============================================================================
// KnowledgeBase
// ============================================================================

/// 순서가 있는 지식 문서 컬렉션
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    documents: Vec<KnowledgeDocument>,
}

impl KnowledgeBase {
    /// 시드 세트로 생성
    pub fn seeded() -> Self {
        Self {
            documents: default_documents(),
        }
    }

    pub fn from_documents(documents: Vec<KnowledgeDocument>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// JSON 텍스트로 컬렉션 교체
    ///
    /// 파싱에 성공하면 컬렉션을 통째로 교체하고 문서 수를 반환합니다.
    /// 실패하면 기존 컬렉션은 그대로 유지됩니다.
    pub fn import_json(&mut self, text: &str) -> Result<usize, ImportError> {
        let documents = parse_documents(text)?;
        let count = documents.len();
        self.documents = documents;

        tracing::info!("Knowledge base replaced ({} documents)", count);
        Ok(count)
    }

    /// 파일에서 컬렉션 교체
    pub fn load_file(&mut self, path: &Path) -> Result<usize, ImportError> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Importing knowledge base from {:?}", path);
        self.import_json(&text)
    }

    /// 컬렉션을 JSON 배열로 내보내기 (2칸 들여쓰기)
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.documents)
    }

    /// 빈 항목 추가 후 ID 반환
    pub fn add_entry(&mut self) -> String {
        let mut id = format!("custom-{}", Utc::now().timestamp_millis());
        // 같은 밀리초에 여러 번 추가된 경우
        while self.get(&id).is_some() {
            id.push('-');
            id.push_str(&self.documents.len().to_string());
        }

        self.documents.push(KnowledgeDocument {
            id: id.clone(),
            title: "New Entry".to_string(),
            content: "Describe project, tools, role, outcomes…".to_string(),
            tags: Vec::new(),
        });

        id
    }

    /// ID로 항목 삭제
    pub fn remove_entry(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        before != self.documents.len()
    }
}

/// JSON 텍스트를 문서 목록으로 파싱하고 검증
fn parse_documents(text: &str) -> Result<Vec<KnowledgeDocument>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;

    let serde_json::Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let mut documents = Vec::with_capacity(items.len());
    let mut seen = HashSet::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let doc: KnowledgeDocument = serde_json::from_value(item)
            .map_err(|source| ImportError::InvalidEntry { index, source })?;

        if !seen.insert(doc.id.clone()) {
            return Err(ImportError::DuplicateId(doc.id));
        }
        documents.push(doc);
    }

    Ok(documents)
}

// ============================================================================
// Tests
// ============================================================================
