//! CLI 모듈
//!
//! ask-anurag CLI 명령어 정의 및 구현

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::answer::AnswerMode;
use crate::config::{AskConfig, API_KEY_ENV};
use crate::knowledge::{KnowledgeBase, RankedResult, SUGGESTED_QUESTIONS};
use crate::session::{AskOutcome, AskSession, AskState};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "ask-anurag")]
#[command(version, about = "포트폴리오 지식베이스 Q&A", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 질문하고 답변 받기
    Ask {
        /// 질문
        question: String,

        /// 지식베이스 JSON 파일 (없으면 기본 시드)
        #[arg(short, long)]
        kb: Option<PathBuf>,

        /// 원격 임베딩/생성 사용 (OPENAI_API_KEY 필요)
        #[arg(short, long)]
        remote: bool,

        /// 컨텍스트로 사용할 상위 문서 수
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// 관련도 순위만 출력
    Rank {
        /// 검색 쿼리
        query: String,

        /// 지식베이스 JSON 파일
        #[arg(short, long)]
        kb: Option<PathBuf>,

        /// 임베딩 랭킹 사용
        #[arg(short, long)]
        remote: bool,

        /// 임베딩 실패 시 TF-IDF로 재시도
        #[arg(long)]
        fallback: bool,

        /// 결과 개수 제한
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// 지식베이스 관리
    Kb {
        #[command(subcommand)]
        command: KbCommands,
    },

    /// 추천 질문 목록
    Suggest,

    /// 상태 확인
    Status,
}

#[derive(Subcommand)]
pub enum KbCommands {
    /// 지식베이스를 JSON으로 출력
    Export {
        /// 지식베이스 JSON 파일 (없으면 기본 시드)
        #[arg(short, long)]
        kb: Option<PathBuf>,
    },

    /// JSON 파일을 가져올 수 있는지 검사
    Check {
        /// 검사할 파일
        file: PathBuf,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask {
            question,
            kb,
            remote,
            top,
        } => cmd_ask(&question, kb, remote, top).await,
        Commands::Rank {
            query,
            kb,
            remote,
            fallback,
            limit,
        } => cmd_rank(&query, kb, remote, fallback, limit).await,
        Commands::Kb { command } => match command {
            KbCommands::Export { kb } => cmd_kb_export(kb),
            KbCommands::Check { file } => cmd_kb_check(file),
        },
        Commands::Suggest => cmd_suggest(),
        Commands::Status => cmd_status(),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 질문 명령어 (ask)
async fn cmd_ask(
    question: &str,
    kb: Option<PathBuf>,
    remote: bool,
    top: Option<usize>,
) -> Result<()> {
    let mut config = load_config(remote)?;
    if let Some(top) = top {
        config.composer.top_n = top.max(1);
    }

    let knowledge = load_knowledge(kb)?;
    let session = AskSession::from_config(&config, knowledge).context("세션 초기화 실패")?;

    if remote && session.mode() == AnswerMode::Local {
        println!("[!] API 키가 없어 로컬 모드로 답변합니다 ({} 미설정)", API_KEY_ENV);
    }

    report_outcome(session.ask(question).await)
}

/// 질문 결과 출력
///
/// 답변 생성 실패는 에러로 반환해 종료 코드로 구분할 수 있게 합니다.
fn report_outcome(outcome: AskOutcome) -> Result<()> {
    match outcome {
        AskOutcome::Ignored => {
            println!("[!] 질문이 비어 있습니다.");
        }
        AskOutcome::Committed(AskState::Answered { answer, .. }) => {
            println!("[OK] {}\n", answer.mode.label());
            println!("{}", answer.text);
        }
        AskOutcome::Committed(AskState::Failed { message, query, .. }) => {
            println!("[!] {}", message);
            println!("    질문: {}", query);
            anyhow::bail!("답변 생성 실패: {}", query);
        }
        AskOutcome::Committed(state) => {
            tracing::debug!("Unexpected committed state: {:?}", state);
        }
        AskOutcome::Superseded { seq } => {
            tracing::debug!("Ask cycle {} superseded", seq);
        }
    }

    Ok(())
}

/// 순위 명령어 (rank)
async fn cmd_rank(
    query: &str,
    kb: Option<PathBuf>,
    remote: bool,
    fallback: bool,
    limit: usize,
) -> Result<()> {
    let config = load_config(remote)?;
    let knowledge = load_knowledge(kb)?;
    let session = AskSession::from_config(&config, knowledge.clone()).context("세션 초기화 실패")?;
    let ranker = session.ranker();

    println!("[*] 순위 계산 중: \"{}\" ({:?})", query, ranker.mode());

    let results = if fallback {
        ranker.rank_with_fallback(query, knowledge.documents()).await
    } else {
        ranker
            .rank(query, knowledge.documents())
            .await
            .context("순위 계산 실패")?
    };

    if results.is_empty() {
        println!("\n[!] 지식베이스가 비어 있습니다.");
        return Ok(());
    }

    println!("\n[OK] 결과 ({} 건):\n", results.len().min(limit));
    print_ranked(&results, limit);

    Ok(())
}

/// 지식베이스 내보내기 (kb export)
fn cmd_kb_export(kb: Option<PathBuf>) -> Result<()> {
    let knowledge = load_knowledge(kb)?;
    let json = knowledge.export_json().context("JSON 직렬화 실패")?;
    println!("{}", json);
    Ok(())
}

/// 지식베이스 파일 검사 (kb check)
fn cmd_kb_check(file: PathBuf) -> Result<()> {
    let mut knowledge = KnowledgeBase::default();
    match knowledge.load_file(&file) {
        Ok(count) => {
            println!("[OK] {:?}: {} 문서", file, count);
            for doc in knowledge.documents() {
                println!("  - {:<20} {}", doc.id, truncate_text(&doc.title, 50));
            }
            Ok(())
        }
        Err(e) => {
            println!("[!] {:?}: {}", file, e);
            Err(e).context("지식베이스 검사 실패")
        }
    }
}

/// 추천 질문 (suggest)
fn cmd_suggest() -> Result<()> {
    println!("[*] 추천 질문:");
    for question in SUGGESTED_QUESTIONS {
        println!("  - {}", question);
    }
    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status() -> Result<()> {
    println!("ask-anurag v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = AskConfig::from_env().context("설정 로드 실패")?;

    // 원격 모드와 같은 규칙 (공백만 있는 키는 미설정)
    if config.api_key.is_some() {
        println!("[OK] API 키: 설정됨");
    } else {
        println!("[!] API 키: 미설정 (로컬 모드만 사용 가능)");
        println!("    설정: export {}=your-key", API_KEY_ENV);
    }

    println!("[*] 서비스 URL: {}", config.base_url);
    println!(
        "[*] 모델: {} / {}",
        config.embedding_model, config.generation_model
    );

    let knowledge = KnowledgeBase::seeded();
    let total_bytes: usize = knowledge.documents().iter().map(|d| d.content.len()).sum();
    println!(
        "[OK] 기본 지식베이스: {} 문서, {}",
        knowledge.len(),
        format_bytes(total_bytes)
    );

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 환경변수 설정 + CLI 플래그
fn load_config(remote: bool) -> Result<AskConfig> {
    let mut config = AskConfig::from_env().context("설정 로드 실패")?;
    config.remote_enabled = remote;
    Ok(config)
}

/// 기본 시드 또는 파일에서 지식베이스 로드
fn load_knowledge(kb: Option<PathBuf>) -> Result<KnowledgeBase> {
    let mut knowledge = KnowledgeBase::seeded();
    if let Some(path) = kb {
        knowledge
            .load_file(&path)
            .with_context(|| format!("지식베이스 로드 실패: {:?}", path))?;
    }
    Ok(knowledge)
}

fn print_ranked(results: &[RankedResult<'_>], limit: usize) {
    for (i, result) in results.iter().take(limit).enumerate() {
        let doc = result.document;
        println!(
            "{}. [점수: {:.4}] {} ({})",
            i + 1,
            result.score,
            doc.title,
            doc.id
        );
        println!("   내용: {}", truncate_text(&doc.content, 120));
        if !doc.tags.is_empty() {
            println!("   태그: {}", doc.tags.join(", "));
        }
        println!();
    }
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::try_parse_from(["ask-anurag", "ask", "What stack?", "--remote", "-t", "2"])
            .unwrap();
        match cli.command {
            Commands::Ask {
                question,
                remote,
                top,
                kb,
            } => {
                assert_eq!(question, "What stack?");
                assert!(remote);
                assert_eq!(top, Some(2));
                assert!(kb.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_cli_parses_kb_check() {
        let cli = Cli::try_parse_from(["ask-anurag", "kb", "check", "kb.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Kb {
                command: KbCommands::Check { .. }
            }
        ));
    }

    #[test]
    fn test_load_knowledge_default_and_file() {
        assert_eq!(load_knowledge(None).unwrap(), KnowledgeBase::seeded());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "only", "title": "Only", "content": "x"}}]"#).unwrap();
        let kb = load_knowledge(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_failed_ask_is_an_error() {
        let failed = AskOutcome::Committed(AskState::Failed {
            seq: 1,
            message: crate::session::FAILURE_MESSAGE.to_string(),
            query: "What stack?".to_string(),
        });
        assert!(report_outcome(failed).is_err());

        let answered = AskOutcome::Committed(AskState::Answered {
            seq: 2,
            answer: crate::answer::Answer {
                text: "React".to_string(),
                sources: vec!["Project A".to_string()],
                mode: AnswerMode::Local,
            },
        });
        assert!(report_outcome(answered).is_ok());
        assert!(report_outcome(AskOutcome::Ignored).is_ok());
        assert!(report_outcome(AskOutcome::Superseded { seq: 1 }).is_ok());
    }

    #[test]
    fn test_kb_check_rejects_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": "a"}}"#).unwrap();
        assert!(cmd_kb_check(file.path().to_path_buf()).is_err());
    }
}
