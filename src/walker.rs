//! 폴더 탐색 모듈
//!
//! 루트 폴더를 재귀 탐색하면서 무시 폴더를 내려가기 전에 잘라내고(pruning),
//! 확장자가 일치하는 (폴더, 파일 이름) 쌍을 지연(lazy) 반복자로 돌려줍니다.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{resolve_path, Config, IgnoreSet};
use crate::extension::ExtensionMatcher;

/// 탐색으로 찾은 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// 파일이 있는 폴더
    pub dir: PathBuf,
    /// 표시/키 생성용 파일 이름 (UTF-8이 아니면 손실 변환)
    pub file_name: String,
    /// 실제 파일 이름
    os_name: OsString,
}

impl MatchedFile {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<OsString>) -> Self {
        let os_name = name.into();
        Self {
            dir: dir.into(),
            file_name: os_name.to_string_lossy().into_owned(),
            os_name,
        }
    }

    /// 전체 경로 (복사 원본)
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.os_name)
    }
}

/// 무시 규칙과 확장자 필터를 적용하는 폴더 탐색기
pub struct Traversal<'a> {
    root: PathBuf,
    ignore: &'a IgnoreSet,
    extensions: &'a ExtensionMatcher,
    excluded: Vec<PathBuf>,
}

impl<'a> Traversal<'a> {
    /// 새 탐색기 생성
    pub fn new(root: &Path, ignore: &'a IgnoreSet, extensions: &'a ExtensionMatcher) -> Self {
        Self {
            root: resolve_path(root),
            ignore,
            extensions,
            excluded: Vec::new(),
        }
    }

    /// 설정으로부터 탐색기 생성 (스테이징/출력 폴더는 항상 제외)
    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.source_dir, &config.ignore, &config.extensions)
            .with_excluded(config.excluded_dirs())
    }

    /// 이름과 무관하게 제외할 폴더 경로 추가
    pub fn with_excluded(mut self, dirs: Vec<PathBuf>) -> Self {
        self.excluded
            .extend(dirs.iter().map(|dir| resolve_path(dir)));
        self
    }

    /// 정규화된 탐색 루트
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 일치하는 파일을 지연 반복자로 반환
    ///
    /// 형제 항목은 이름순으로 방문하므로 결과 순서가 재현 가능합니다.
    pub fn files(&self) -> impl Iterator<Item = MatchedFile> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.should_descend(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("탐색 중 항목을 건너뜁니다: {}", e);
                    None
                }
            })
            .filter(is_file_or_file_link)
            .filter_map(move |entry| self.accept_file(&entry))
    }

    /// 폴더 가지치기: 무시 폴더와 도구 자체 폴더는 내려가지 않음
    fn should_descend(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        if self.ignore.is_ignored_dir(&name) {
            debug!("무시 폴더 제외: {}", entry.path().display());
            return false;
        }
        if self.excluded.iter().any(|dir| dir == entry.path()) {
            debug!("작업 폴더 제외: {}", entry.path().display());
            return false;
        }
        true
    }

    fn accept_file(&self, entry: &DirEntry) -> Option<MatchedFile> {
        let file = MatchedFile::new(entry.path().parent()?, entry.file_name());
        if self.ignore.is_ignored_file(&file.file_name) || !self.extensions.matches(&file.file_name)
        {
            return None;
        }
        Some(file)
    }
}

/// 일반 파일이거나 파일을 가리키는 심볼릭 링크 (폴더 링크는 따라가지 않음)
fn is_file_or_file_link(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
