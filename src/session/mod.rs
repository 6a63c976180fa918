//! Ask 세션 - 질문 사이클 상태 머신
//!
//! Idle → Busy (비어 있지 않은 질문) → {Answered | Failed} → 다음 질문에서 다시 Busy
//!
//! 각 사이클은 단조 증가하는 시퀀스 번호를 받습니다.
//! 늦게 도착한 이전 사이클의 결과는 최신 사이클이 아니면 버려집니다.
//! 한 사이클 안에서 랭킹은 항상 생성보다 먼저 끝납니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{Mutex, RwLock};

use crate::answer::{
    build_messages, compose_local, remote_answer, Answer, AnswerMode, ComposerConfig,
};
use crate::config::AskConfig;
use crate::embedding::OpenAiEmbedding;
use crate::error::ImportError;
use crate::generation::{GenerationProvider, OpenAiResponses};
use crate::knowledge::{KnowledgeBase, KnowledgeDocument, Ranker};

/// 사용자에게 보여주는 일반 실패 메시지
pub const FAILURE_MESSAGE: &str = "Sorry, I couldn't generate an answer.";

// ============================================================================
// State
// ============================================================================

/// 질문 사이클 상태
#[derive(Debug, Clone, PartialEq)]
pub enum AskState {
    Idle,
    Busy {
        seq: u64,
    },
    Answered {
        seq: u64,
        answer: Answer,
    },
    Failed {
        seq: u64,
        message: String,
        /// 재시도를 위해 보존된 질문
        query: String,
    },
}

impl AskState {
    pub fn is_busy(&self) -> bool {
        matches!(self, AskState::Busy { .. })
    }
}

/// `ask` 호출 결과
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    /// 빈 질문 (무시됨, 상태 변화 없음)
    Ignored,
    /// 최신 사이클의 결과가 반영됨
    Committed(AskState),
    /// 더 새로운 사이클이 시작되어 결과가 버려짐
    Superseded { seq: u64 },
}

// ============================================================================
// AskSession
// ============================================================================

/// 질문 세션
///
/// 지식베이스, 랭커, (원격 모드의) 생성기, 현재 상태를 소유합니다.
pub struct AskSession {
    knowledge: RwLock<KnowledgeBase>,
    ranker: Ranker,
    generator: Option<Arc<dyn GenerationProvider>>,
    composer: ComposerConfig,
    latest_seq: AtomicU64,
    state: Mutex<AskState>,
}

impl AskSession {
    /// 구성 요소로 세션 생성
    ///
    /// `generator`가 있으면 원격 답변 모드입니다.
    pub fn new(
        knowledge: KnowledgeBase,
        ranker: Ranker,
        generator: Option<Arc<dyn GenerationProvider>>,
        composer: ComposerConfig,
    ) -> Self {
        Self {
            knowledge: RwLock::new(knowledge),
            ranker,
            generator,
            composer,
            latest_seq: AtomicU64::new(0),
            state: Mutex::new(AskState::Idle),
        }
    }

    /// 설정으로 세션 생성
    ///
    /// 원격 모드가 켜져 있고 API 키가 있을 때만 OpenAI 클라이언트를 연결합니다.
    pub fn from_config(config: &AskConfig, knowledge: KnowledgeBase) -> Result<Self> {
        let ranker = Ranker::lexical(config.smoothing);

        let (ranker, generator) = match config.api_key.as_ref().filter(|_| config.remote_enabled) {
            Some(api_key) => {
                let embedder = OpenAiEmbedding::new(
                    api_key.clone(),
                    &config.base_url,
                    config.embedding_model.clone(),
                )
                .context("Failed to create embedding client")?;

                let generator = OpenAiResponses::new(
                    api_key.clone(),
                    &config.base_url,
                    config.generation_model.clone(),
                )
                .context("Failed to create generation client")?;

                tracing::info!(
                    "Remote mode: {} + {}",
                    config.embedding_model,
                    config.generation_model
                );

                let generator: Arc<dyn GenerationProvider> = Arc::new(generator);
                (ranker.with_embedder(Arc::new(embedder)), Some(generator))
            }
            None => {
                if config.remote_enabled {
                    tracing::warn!("Remote mode requested but no API key is set, using local mode");
                }
                (ranker, None)
            }
        };

        Ok(Self::new(knowledge, ranker, generator, config.composer.clone()))
    }

    /// 답변 모드
    pub fn mode(&self) -> AnswerMode {
        if self.generator.is_some() {
            AnswerMode::Remote
        } else {
            AnswerMode::Local
        }
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// 현재 상태 (복사본)
    pub async fn state(&self) -> AskState {
        self.state.lock().await.clone()
    }

    /// 현재 지식베이스 (복사본)
    pub async fn knowledge(&self) -> KnowledgeBase {
        self.knowledge.read().await.clone()
    }

    /// JSON으로 지식베이스 교체
    ///
    /// 실패하면 기존 컬렉션과 상태는 그대로 유지됩니다.
    pub async fn replace_knowledge(&self, text: &str) -> Result<usize, ImportError> {
        self.knowledge.write().await.import_json(text)
    }

    /// 질문 사이클 실행
    pub async fn ask(&self, query: &str) -> AskOutcome {
        if query.trim().is_empty() {
            return AskOutcome::Ignored;
        }

        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            if self.is_latest(seq) {
                *state = AskState::Busy { seq };
            }
        }

        // 사이클 동안 사용할 스냅샷 (교체와 독립)
        let knowledge = self.knowledge.read().await.clone();

        let next = match self.run_cycle(query, knowledge.documents()).await {
            Ok(answer) => {
                tracing::info!(seq, sources = answer.sources.len(), "Answered question");
                AskState::Answered { seq, answer }
            }
            Err(e) => {
                tracing::warn!(seq, "Ask cycle failed: {:#}", e);
                AskState::Failed {
                    seq,
                    message: FAILURE_MESSAGE.to_string(),
                    query: query.to_string(),
                }
            }
        };

        let mut state = self.state.lock().await;
        if !self.is_latest(seq) {
            tracing::debug!(seq, "Discarding stale ask result");
            return AskOutcome::Superseded { seq };
        }

        *state = next.clone();
        AskOutcome::Committed(next)
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest_seq.load(Ordering::SeqCst) == seq
    }

    /// 랭킹 → (생성 | 로컬 요약)
    async fn run_cycle(&self, query: &str, docs: &[KnowledgeDocument]) -> Result<Answer> {
        let ranked = self
            .ranker
            .rank(query, docs)
            .await
            .context("Ranking failed")?;

        let top: Vec<&KnowledgeDocument> = ranked
            .iter()
            .take(self.composer.top_n)
            .map(|r| r.document)
            .collect();

        tracing::debug!("Using top {} of {} documents", top.len(), ranked.len());

        match &self.generator {
            Some(generator) => {
                let messages = build_messages(query, &top);
                let text = generator
                    .generate(&messages)
                    .await
                    .context("Generation failed")?;
                Ok(remote_answer(text, &top))
            }
            None => Ok(compose_local(query, &top, &self.composer)),
        }
    }
}

impl std::fmt::Debug for AskSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AskSession")
            .field("ranker", &self.ranker)
            .field("mode", &self.mode())
            .field("latest_seq", &self.latest_seq.load(Ordering::SeqCst))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
