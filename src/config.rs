//! 설정 모듈
//!
//! 실행 시작 시 한 번 만들어져 모든 단계에 참조로 전달되는 불변 설정을 정의합니다.
//! 우선순위는 CLI 인자 > TOML 설정 파일 > 내장 기본값 순서입니다.

use encoding_rs::Encoding;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{CodeTextifyError, Result};
use crate::extension::{normalize_extension, ExtensionMatcher};
use crate::splitter::BoundaryDetector;

/// 출력 파일 하나의 기본 최대 문자 수
pub const DEFAULT_MAX_CHARS: usize = 75_000;

/// 허용되는 최소 max_chars (헤더/인덱스 추정치보다 충분히 커야 함)
pub const MIN_MAX_CHARS: usize = 1_000;

/// 기본 출력 파일 접두사
pub const DEFAULT_OUTPUT_PREFIX: &str = "MergedFile";

/// 소스 폴더 아래에 만들어지는 기본 작업 폴더 이름
pub const DEFAULT_WORK_DIR: &str = "CodeTextify";

/// 기본 인코딩 시도 순서
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8"];

/// 기본 무시 폴더 이름 (소문자)
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
    "dist",
    "build",
    "target",
    ".next",
    ".nuxt",
    "coverage",
    ".cache",
    ".pytest_cache",
    ".mypy_cache",
    ".godot",
    ".import",
];

/// 기본 무시 파일 이름 (소문자)
pub const DEFAULT_IGNORED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.lock",
    "poetry.lock",
    ".ds_store",
    "thumbs.db",
    "readme.md",
    "license",
];

/// 무시할 폴더/파일 이름 집합
///
/// 모든 이름은 소문자로 저장되며, 비교 시 대상 이름도 소문자로 바꿔 비교합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    dirs: BTreeSet<String>,
    files: BTreeSet<String>,
}

impl IgnoreSet {
    /// 빈 무시 집합
    pub fn empty() -> Self {
        Self::default()
    }

    /// 내장 기본 무시 목록
    pub fn defaults() -> Self {
        Self::empty()
            .with_dirs(DEFAULT_IGNORED_DIRS.iter().copied())
            .with_files(DEFAULT_IGNORED_FILES.iter().copied())
    }

    /// 무시 폴더 이름 추가
    pub fn with_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dirs
            .extend(names.into_iter().map(|n| n.as_ref().trim().to_lowercase()));
        self
    }

    /// 무시 파일 이름 추가
    pub fn with_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.files
            .extend(names.into_iter().map(|n| n.as_ref().trim().to_lowercase()));
        self
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.dirs.contains(&name.to_lowercase())
    }

    pub fn is_ignored_file(&self, name: &str) -> bool {
        self.files.contains(&name.to_lowercase())
    }

    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

/// 실행 전체에 걸쳐 불변인 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 탐색할 프로젝트 루트
    pub source_dir: PathBuf,
    /// 스테이징 폴더 (실행마다 초기화)
    pub staging_dir: PathBuf,
    /// 병합 결과 폴더 (실행마다 초기화)
    pub output_dir: PathBuf,
    /// 대상 확장자
    pub extensions: ExtensionMatcher,
    /// 출력 파일 하나의 최대 문자 수 (추정 여유분만큼 넘을 수 있음)
    pub max_chars: usize,
    /// 출력 파일 이름 접두사
    pub output_prefix: String,
    /// 무시 폴더/파일 집합
    pub ignore: IgnoreSet,
    /// 대용량 파일 분할 경계 탐지기
    pub boundary: BoundaryDetector,
    /// 엄격 디코딩을 시도할 인코딩 순서
    pub encodings: Vec<&'static Encoding>,
}

impl Config {
    /// 기본 설정 생성
    ///
    /// 작업 폴더는 `<source>/CodeTextify/TXTs`, `<source>/CodeTextify/Merged`가 됩니다.
    pub fn new(source_dir: impl Into<PathBuf>, extensions: ExtensionMatcher) -> Self {
        let source_dir = source_dir.into();
        let work_dir = source_dir.join(DEFAULT_WORK_DIR);
        Self {
            staging_dir: work_dir.join("TXTs"),
            output_dir: work_dir.join("Merged"),
            source_dir,
            extensions,
            max_chars: DEFAULT_MAX_CHARS,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            ignore: IgnoreSet::defaults(),
            boundary: BoundaryDetector::default(),
            encodings: vec![encoding_rs::UTF_8],
        }
    }

    /// 스테이징 폴더 설정
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// 출력 폴더 설정
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// 최대 문자 수 설정
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// 출력 파일 접두사 설정
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// 무시 집합 교체
    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// 분할 경계 탐지기 교체
    pub fn with_boundary(mut self, boundary: BoundaryDetector) -> Self {
        self.boundary = boundary;
        self
    }

    /// 인코딩 시도 순서 교체
    pub fn with_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// 설정 파일 값을 적용
    ///
    /// 무시 목록은 현재 목록에 추가되고, 나머지 값은 덮어씁니다.
    pub fn apply_file(mut self, file: FileConfig) -> Result<Self> {
        if let Some(max_chars) = file.max_chars {
            self.max_chars = max_chars;
        }
        if let Some(prefix) = file.output_prefix {
            self.output_prefix = prefix;
        }
        if let Some(dirs) = file.ignored_dirs {
            self.ignore = self.ignore.with_dirs(dirs);
        }
        if let Some(files) = file.ignored_files {
            self.ignore = self.ignore.with_files(files);
        }
        if file.split_markers.is_some() || file.code_extensions.is_some() {
            let markers = file
                .split_markers
                .unwrap_or_else(|| self.boundary.markers().to_vec());
            let code_extensions = file
                .code_extensions
                .map(|exts| exts.iter().map(|e| normalize_extension(e.trim())).collect())
                .unwrap_or_else(|| self.boundary.code_extensions().to_vec());
            self.boundary = BoundaryDetector::new(markers, code_extensions);
        }
        if let Some(labels) = file.encodings {
            self.encodings = resolve_encodings(&labels)?;
        }
        Ok(self)
    }

    /// 설정 유효성 검사
    ///
    /// 파일 시스템을 변경하기 전에 호출해야 합니다.
    pub fn validate(&self) -> Result<()> {
        if !self.source_dir.exists() {
            return Err(CodeTextifyError::SourceNotFound {
                path: self.source_dir.clone(),
            });
        }
        if !self.source_dir.is_dir() {
            return Err(CodeTextifyError::NotADirectory {
                path: self.source_dir.clone(),
            });
        }

        if self.max_chars < MIN_MAX_CHARS {
            return Err(CodeTextifyError::InvalidMaxChars {
                value: self.max_chars,
                min: MIN_MAX_CHARS,
            });
        }

        let prefix = self.output_prefix.trim();
        if prefix.is_empty()
            || prefix
                .chars()
                .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        {
            return Err(CodeTextifyError::InvalidPrefix {
                prefix: self.output_prefix.clone(),
            });
        }

        // 초기화 단계에서 작업 폴더를 통째로 지우므로 소스를 포함하면 안 됨
        let source = resolve_path(&self.source_dir);
        let staging = resolve_path(&self.staging_dir);
        let output = resolve_path(&self.output_dir);
        for dir in [&staging, &output] {
            if source.starts_with(dir) {
                return Err(CodeTextifyError::UnsafeWorkDir { path: dir.clone() });
            }
        }
        if staging == output {
            return Err(CodeTextifyError::SameWorkDirs { path: staging });
        }

        Ok(())
    }

    /// 탐색에서 항상 제외할 도구 자체의 폴더
    pub fn excluded_dirs(&self) -> Vec<PathBuf> {
        vec![
            resolve_path(&self.staging_dir),
            resolve_path(&self.output_dir),
        ]
    }
}

/// TOML 설정 파일 구조
///
/// ```toml
/// max_chars = 60000
/// output_prefix = "Context"
/// ignored_dirs = ["fixtures"]
/// ignored_files = ["secrets.py"]
/// split_markers = ["\nfn ", "\nimpl "]
/// code_extensions = [".rs"]
/// encodings = ["utf-8", "euc-kr"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_chars: Option<usize>,
    pub output_prefix: Option<String>,
    /// 기본 무시 폴더에 추가
    pub ignored_dirs: Option<Vec<String>>,
    /// 기본 무시 파일에 추가
    pub ignored_files: Option<Vec<String>>,
    pub split_markers: Option<Vec<String>>,
    pub code_extensions: Option<Vec<String>>,
    pub encodings: Option<Vec<String>>,
}

impl FileConfig {
    /// 설정 파일 읽기
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CodeTextifyError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// TOML 문자열 파싱
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| CodeTextifyError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// 인코딩 이름 목록을 `encoding_rs` 인코딩으로 변환
pub fn resolve_encodings<S: AsRef<str>>(labels: &[S]) -> Result<Vec<&'static Encoding>> {
    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                CodeTextifyError::UnknownEncoding {
                    label: label.to_string(),
                }
            })
        })
        .collect()
}

/// 비교 가능한 절대 경로로 변환
///
/// 존재하는 가장 가까운 상위 폴더까지는 정규화(canonicalize)하고,
/// 아직 없는 나머지 경로는 그대로 이어 붙입니다.
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = absolute.as_path();
    let mut missing: Vec<Component<'_>> = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            let mut resolved = canonical;
            for component in missing.iter().rev() {
                match component {
                    Component::ParentDir => {
                        resolved.pop();
                    }
                    Component::CurDir => {}
                    other => resolved.push(other.as_os_str()),
                }
            }
            return resolved;
        }
        match (existing.parent(), existing.components().next_back()) {
            (Some(parent), Some(last)) => {
                missing.push(last);
                existing = parent;
            }
            _ => return absolute,
        }
    }
}
