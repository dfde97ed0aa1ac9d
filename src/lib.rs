//! codetextify - CODE TEXTIFY
//!
//! 프로젝트 폴더의 소스 파일들을 크기 제한이 있는 병합 텍스트 파일로 묶는 CLI 도구입니다.
//! 컨텍스트 창에 붙여 넣거나 코드베이스를 보관/검토하기 위한 큰 텍스트 덩어리를 만듭니다.
//!
//! # 처리 흐름
//!
//! 1. **탐색** ([`walker`]): 무시 폴더는 내려가기 전에 잘라내고, 확장자가 일치하는 파일만 수집
//! 2. **스테이징** ([`staging`]): 상대 경로 기반 고유 키 이름으로 평평한 폴더에 복사하고 파일 맵 저장
//! 3. **병합** ([`merger`]): 이름순으로 읽어 `max_chars` 단위로 묶고, 너무 큰 파일은 조각으로 분할
//!
//! # 예제
//!
//! ```bash
//! # 파이썬/자바스크립트 파일 병합
//! codetextify .py .js
//!
//! # 다른 폴더, 더 작은 출력 파일
//! codetextify tsx --source ./my-app --max-chars 60000
//!
//! # 미리보기
//! codetextify .rs --dry-run
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod hook;
pub mod merger;
pub mod reader;
pub mod splitter;
pub mod staging;
pub mod stats;
pub mod walker;
pub mod workspace;

// Re-exports for convenient access
pub use cli::Args;
pub use config::{Config, FileConfig, IgnoreSet};
pub use error::{CodeTextifyError, Result};
pub use extension::ExtensionMatcher;
pub use hook::{NoopHook, OpenFolderHook, PostProcessHook};
pub use merger::{merge_staged, MergePlanner, MergeReport, OutputFile, OutputKind};
pub use splitter::{split_content, BoundaryDetector};
pub use staging::{sanitize_key, stage_files, FileMap, StagedEntry, StagingReport};
pub use stats::{format_bytes, Statistics};
pub use walker::{MatchedFile, Traversal};
