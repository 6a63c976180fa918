//! 토크나이저
//!
//! 쿼리와 문서에 동일하게 적용되는 단순 토크나이저입니다.
//! 소문자로 변환한 뒤 ASCII 영숫자가 아닌 모든 문자를 구분자로 취급합니다.

/// 텍스트를 소문자 영숫자 토큰으로 분할
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(
            tokenize("React, TypeScript & Node.js!"),
            vec!["react", "typescript", "node", "js"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  --- ,,, ").is_empty());
    }

    #[test]
    fn test_tokenize_non_ascii_is_separator() {
        assert_eq!(tokenize("real‑time"), vec!["real", "time"]);
        assert_eq!(tokenize("안녕 hello"), vec!["hello"]);
    }

    #[test]
    fn test_tokenize_idempotent() {
        let inputs = [
            "Project A — Smart Logistics Dashboard",
            "Tech: Next.js, tRPC, Prisma, MySQL.",
            "  ÄÖÜ mixed CASE 123abc  ",
        ];

        for input in inputs {
            let once = tokenize(input);
            let twice = tokenize(&once.join(" "));
            assert_eq!(once, twice);
        }
    }
}
