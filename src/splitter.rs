//! 대용량 파일 분할 모듈
//!
//! 한 파일이 출력 파일 하나에 들어가지 않을 때 문자 예산 단위로 조각을 잘라냅니다.
//! 코드 파일은 예산 창 안에서 마지막 선언 키워드(`\ndef ` 등) 직전에서 자르도록 시도합니다.
//! 실제 파서가 아닌 순수 어휘(문자열) 매칭입니다.

/// 기본 분할 경계 표식 (줄바꿈 + 선언 키워드)
pub const DEFAULT_SPLIT_MARKERS: &[&str] = &[
    "\nfunction ",
    "\ndef ",
    "\nfunc ",
    "\nclass ",
    "\nexport ",
    "\nimport ",
];

/// 경계 탐지를 적용할 기본 코드 확장자
pub const DEFAULT_CODE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".jsx", ".mjs", ".ts", ".tsx", ".gd", ".java", ".cpp", ".c", ".cs", ".go",
    ".kt", ".swift", ".php", ".rb",
];

/// 표식 문자열 목록 기반 분할 경계 탐지기
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryDetector {
    markers: Vec<String>,
    code_extensions: Vec<String>,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPLIT_MARKERS.iter().map(|m| m.to_string()).collect(),
            DEFAULT_CODE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }
}

impl BoundaryDetector {
    /// 새 탐지기 생성 (빈 표식은 제외)
    pub fn new(markers: Vec<String>, code_extensions: Vec<String>) -> Self {
        Self {
            markers: markers.into_iter().filter(|m| !m.is_empty()).collect(),
            code_extensions,
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn code_extensions(&self) -> &[String] {
        &self.code_extensions
    }

    /// 파일 이름이 코드 확장자로 끝나는지 확인
    pub fn applies_to(&self, file_name: &str) -> bool {
        self.code_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// 창 안에서 가장 뒤에 있는 표식 위치 (바이트 오프셋)
    ///
    /// 창의 시작(0)에 있는 표식은 진전이 없으므로 무시합니다.
    pub fn find_cut(&self, window: &str) -> Option<usize> {
        self.markers
            .iter()
            .filter_map(|marker| window.rfind(marker.as_str()))
            .filter(|&pos| pos > 0)
            .max()
    }
}

/// 내용을 문자 예산 단위 조각으로 분할
///
/// * `budget` - 조각 하나의 최대 문자 수
/// * `detector` - 코드 파일이면 경계 탐지기, 아니면 `None`
///
/// 공백만 있는 조각은 버립니다. 그 외에는 조각을 이어 붙이면 원본과 정확히 같습니다.
pub fn split_content<'a>(
    content: &'a str,
    budget: usize,
    detector: Option<&BoundaryDetector>,
) -> Vec<&'a str> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut offset = 0;

    while offset < content.len() {
        let remaining = &content[offset..];

        let cut = match remaining.char_indices().nth(budget) {
            // 남은 내용이 예산 안에 들어감
            None => remaining.len(),
            Some((window_end, _)) => {
                let window = &remaining[..window_end];
                detector
                    .and_then(|d| d.find_cut(window))
                    .unwrap_or(window_end)
            }
        };

        let chunk = &remaining[..cut];
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        offset += cut;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_fits_single_chunk() {
        let chunks = split_content("short text", 100, None);
        assert_eq!(chunks, vec!["short text"]);
    }

    #[test]
    fn test_raw_cut_counts_chars_not_bytes() {
        let chunks = split_content("가나다라마", 2, None);
        assert_eq!(chunks, vec!["가나", "다라", "마"]);
    }

    #[test]
    fn test_cut_before_last_marker_in_window() {
        let detector = BoundaryDetector::default();
        let content = "x = 1\ndef a():\n    pass\ndef b():\n    pass\n";
        // 창 "x = 1\ndef a():\n    pass\ndef " 안의 마지막 "\ndef "는 오프셋 23
        let chunks = split_content(content, 28, Some(&detector));
        assert_eq!(chunks[0], "x = 1\ndef a():\n    pass");
        assert!(chunks[1].starts_with("\ndef b():"));
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_marker_at_window_start_is_ignored() {
        let detector = BoundaryDetector::default();
        let content = "\ndef a(): return 1111111111";
        let chunks = split_content(content, 10, Some(&detector));
        assert_eq!(chunks[0], "\ndef a(): ");
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_no_detector_cuts_raw() {
        let content = "abc\ndef ghi\ndef jkl";
        let chunks = split_content(content, 6, None);
        assert_eq!(chunks, vec!["abc\nde", "f ghi\n", "def jk", "l"]);
    }

    #[test]
    fn test_whitespace_only_chunks_dropped() {
        let content = format!("{}{}", "a".repeat(4), " ".repeat(4));
        let chunks = split_content(&content, 4, None);
        assert_eq!(chunks, vec!["aaaa"]);
    }

    #[test]
    fn test_detector_applies_by_extension() {
        let detector = BoundaryDetector::default();
        assert!(detector.applies_to("main.py"));
        assert!(detector.applies_to("page.tsx"));
        assert!(!detector.applies_to("notes.md"));
    }

    #[test]
    fn test_custom_markers() {
        let detector = BoundaryDetector::new(vec!["\nfn ".to_string()], vec![".rs".to_string()]);
        assert_eq!(detector.find_cut("use x;\nfn a() {}\nfn b"), Some(16));
        assert_eq!(detector.find_cut("no markers here"), None);
    }
}
