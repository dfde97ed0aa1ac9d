//! 확장자 매칭 모듈
//!
//! 사용자가 지정한 확장자 토큰을 정규화하고, 파일 이름의 접미사 비교를 담당합니다.
//! glob이나 정규식이 아닌 단순 접미사 비교이며 대소문자를 구분합니다.

use crate::error::{CodeTextifyError, Result};

/// 정규화된 확장자 목록을 가진 매처
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
}

impl ExtensionMatcher {
    /// 새 확장자 매처 생성
    ///
    /// 각 토큰은 앞에 점이 없으면 점을 붙여 정규화합니다 (`py` → `.py`).
    /// 빈 토큰은 무시되며, 남는 확장자가 없으면 에러를 반환합니다.
    ///
    /// # Examples
    /// ```
    /// use codetextify::extension::ExtensionMatcher;
    ///
    /// let matcher = ExtensionMatcher::new(["py", ".tsx"]).unwrap();
    /// assert!(matcher.matches("main.py"));
    /// assert!(matcher.matches("page.tsx"));
    /// assert!(!matcher.matches("page.ts"));
    /// ```
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            let normalized = normalize_extension(token);
            if !extensions.contains(&normalized) {
                extensions.push(normalized);
            }
        }

        if extensions.is_empty() {
            return Err(CodeTextifyError::NoExtensions);
        }

        Ok(Self { extensions })
    }

    /// 파일 이름이 확장자 중 하나로 끝나는지 확인
    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext))
    }

    /// 정규화된 확장자 목록
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// 확장자 토큰을 점으로 시작하는 형태로 정규화
pub fn normalize_extension(token: &str) -> String {
    if token.starts_with('.') {
        token.to_string()
    } else {
        format!(".{}", token)
    }
}
