//! 스테이징 모듈
//!
//! 탐색된 파일을 평평한(flat) 스테이징 폴더에 `<고유 키>.txt` 이름으로 복사하고,
//! 고유 키 → (원본 파일 이름, 상대 경로) 매핑을 `_file_map.json`으로 저장합니다.

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CodeTextifyError, Result};
use crate::walker::MatchedFile;

/// 스테이징 폴더에 저장되는 파일 맵 이름
pub const FILE_MAP_NAME: &str = "_file_map.json";

/// 스테이징 파일 확장자
pub const STAGED_EXTENSION: &str = "txt";

/// 고유 키 최대 길이 (UTF-8 바이트)
///
/// 충돌 접미사(`_<해시>`, `_N`)와 `.txt`를 붙여도 파일 이름 제한(255바이트) 안에 들어갑니다.
pub const MAX_KEY_LEN: usize = 150;

const HASH_LEN: usize = 8;

/// 스테이징된 파일 하나의 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    /// 스테이징 파일 이름(확장자 제외)이자 맵 키
    #[serde(skip)]
    pub unique_key: String,
    /// 원본 파일 이름
    pub original_filename: String,
    /// 스캔 루트 기준 상대 경로 (`/` 구분)
    pub relative_path: String,
}

/// 고유 키 → 스테이징 항목 매핑
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap {
    entries: BTreeMap<String, StagedEntry>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 추가 (같은 키가 있으면 덮어쓰고 이전 항목 반환)
    pub fn insert(&mut self, entry: StagedEntry) -> Option<StagedEntry> {
        self.entries.insert(entry.unique_key.clone(), entry)
    }

    pub fn get(&self, unique_key: &str) -> Option<&StagedEntry> {
        self.entries.get(unique_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 스테이징 폴더에 JSON으로 저장
    pub fn save(&self, staging_dir: &Path) -> Result<PathBuf> {
        let path = staging_dir.join(FILE_MAP_NAME);
        let json =
            serde_json::to_string_pretty(self).map_err(|e| CodeTextifyError::MapSerialize {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        fs::write(&path, json).map_err(|e| CodeTextifyError::WriteError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }

    /// 스테이징 폴더에서 맵 읽기
    ///
    /// 파일이 없거나 손상되었으면 경고 후 `None`을 반환합니다 (대체 모드).
    pub fn load(staging_dir: &Path) -> Option<Self> {
        let path = staging_dir.join(FILE_MAP_NAME);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("파일 맵을 읽을 수 없어 대체 모드로 진행합니다 ({}): {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<FileMap>(&text) {
            Ok(mut map) => {
                for (key, entry) in map.entries.iter_mut() {
                    entry.unique_key = key.clone();
                }
                Some(map)
            }
            Err(e) => {
                warn!("파일 맵이 손상되어 대체 모드로 진행합니다 ({}): {}", path.display(), e);
                None
            }
        }
    }
}

/// 상대 경로를 파일 이름으로 쓸 수 있는 키로 변환
///
/// `\ / : * ? " < > |`와 공백 문자의 연속 구간은 밑줄 하나로 바뀝니다.
/// 결과가 [`MAX_KEY_LEN`] 바이트보다 길면 문자 경계에서 잘라내고 `_TRUNC_<해시>`를 붙입니다.
///
/// # Examples
/// ```
/// use codetextify::staging::sanitize_key;
///
/// assert_eq!(sanitize_key("src/app/page.tsx"), "src_app_page.tsx");
/// assert_eq!(sanitize_key("my docs/a: b.md"), "my_docs_a_b.md");
/// ```
pub fn sanitize_key(relative_path: &str) -> String {
    let mut key = String::with_capacity(relative_path.len());
    let mut in_run = false;
    for c in relative_path.chars() {
        if is_unsafe_char(c) {
            if !in_run {
                key.push('_');
                in_run = true;
            }
        } else {
            key.push(c);
            in_run = false;
        }
    }

    if key.len() > MAX_KEY_LEN {
        let suffix = format!("_TRUNC_{}", short_hash(relative_path));
        let mut keep = MAX_KEY_LEN - suffix.len();
        while !key.is_char_boundary(keep) {
            keep -= 1;
        }
        key.truncate(keep);
        key.push_str(&suffix);
    }

    key
}

fn is_unsafe_char(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_whitespace()
}

/// 상대 경로의 SHA-256 앞 8자리 (16진수)
fn short_hash(relative_path: &str) -> String {
    let digest = Sha256::digest(relative_path.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..HASH_LEN].to_string()
}

/// 실행 단위 고유 키 할당기
///
/// 정제 결과가 이미 쓰인 키와 겹치면(대소문자 무시) 경로 해시를, 그래도 겹치면 번호를 붙입니다.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    used: HashSet<String>,
    collisions: usize,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 상대 경로에 대한 고유 키 할당
    pub fn allocate(&mut self, relative_path: &str) -> String {
        let base = sanitize_key(relative_path);
        if self.try_claim(&base) {
            return base;
        }

        self.collisions += 1;
        let hashed = format!("{}_{}", base, short_hash(relative_path));
        if self.try_claim(&hashed) {
            debug!("키 충돌 해소: {} → {}", relative_path, hashed);
            return hashed;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", hashed, n);
            if self.try_claim(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// 해시/번호로 충돌을 해소한 횟수
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    fn try_claim(&mut self, key: &str) -> bool {
        self.used.insert(key.to_lowercase())
    }
}

/// 루트 기준 상대 경로 (`/` 구분)
pub fn relative_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// 스테이징 파일 이름 (`<key>.txt`)
pub fn staged_file_name(unique_key: &str) -> String {
    format!("{}.{}", unique_key, STAGED_EXTENSION)
}

/// 스테이징 결과
#[derive(Debug)]
pub struct StagingReport {
    /// 성공적으로 복사된 항목
    pub map: FileMap,
    /// 저장된 파일 맵 경로
    pub map_path: PathBuf,
    /// 복사한 총 바이트
    pub bytes_copied: u64,
    /// 복사 실패 (원본 경로, 에러 메시지)
    pub failures: Vec<(PathBuf, String)>,
    /// 키 충돌 해소 횟수
    pub collisions: usize,
}

impl StagingReport {
    pub fn copied(&self) -> usize {
        self.map.len()
    }
}

/// 파일들을 스테이징 폴더에 복사하고 파일 맵을 저장
///
/// # Arguments
/// * `root` - 상대 경로 계산 기준 (정규화된 스캔 루트)
/// * `files` - 탐색 결과
/// * `staging_dir` - 이미 생성된 빈 스테이징 폴더
/// * `progress` - 파일마다 1씩 증가하는 진행률 바
///
/// 개별 복사 실패는 집계만 하고 계속 진행합니다.
/// 하나도 복사되지 않으면 [`CodeTextifyError::NothingStaged`]를 반환합니다.
pub fn stage_files<I>(
    root: &Path,
    files: I,
    staging_dir: &Path,
    progress: &ProgressBar,
) -> Result<StagingReport>
where
    I: IntoIterator<Item = MatchedFile>,
{
    let mut allocator = KeyAllocator::new();
    let mut map = FileMap::new();
    let mut bytes_copied = 0;
    let mut failures = Vec::new();

    for file in files {
        let source = file.path();
        let relative_path = relative_path(root, &source);
        let unique_key = allocator.allocate(&relative_path);
        let dest = staging_dir.join(staged_file_name(&unique_key));

        match fs::copy(&source, &dest) {
            Ok(bytes) => {
                debug!("복사: {} → {}", relative_path, dest.display());
                bytes_copied += bytes;
                map.insert(StagedEntry {
                    unique_key,
                    original_filename: file.file_name,
                    relative_path,
                });
            }
            Err(e) => {
                let error = CodeTextifyError::CopyError {
                    file: source.clone(),
                    reason: e.to_string(),
                };
                warn!("{}", error);
                failures.push((source, error.to_string()));
            }
        }
        progress.inc(1);
    }

    if map.is_empty() {
        return Err(CodeTextifyError::NothingStaged);
    }

    let map_path = map.save(staging_dir)?;

    Ok(StagingReport {
        map,
        map_path,
        bytes_copied,
        failures,
        collisions: allocator.collisions(),
    })
}
