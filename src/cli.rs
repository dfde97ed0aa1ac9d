//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 설정 변환을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, FileConfig, IgnoreSet};
use crate::error::Result;
use crate::extension::ExtensionMatcher;

/// codetextify CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "codetextify",
    author = "CodeTextify Contributors",
    version,
    about = "CODE TEXTIFY - 프로젝트 소스 파일들을 크기 제한이 있는 병합 텍스트 파일로 묶는 CLI 도구",
    long_about = r#"
CODE TEXTIFY
============

프로젝트 폴더를 탐색하여 지정한 확장자의 파일을 모으고,
스테이징 폴더에 복사한 뒤 크기 제한이 있는 병합 텍스트 파일들로 묶습니다.
각 병합 파일은 포함된 파일 목록(인덱스)으로 시작합니다.

특징:
  • node_modules 같은 무시 폴더는 아예 내려가지 않음
  • 같은 이름의 파일도 상대 경로 기반 고유 키로 구분
  • 너무 큰 파일은 함수/클래스 선언 직전에서 나눠 여러 조각으로 기록
  • 인코딩 자동 대체 및 바이너리 파일 건너뛰기

예제:
  codetextify .py .js
  codetextify py tsx --source ./my-app --max-chars 60000
  codetextify .rs --config codetextify.toml --open
  codetextify .ts --dry-run
"#
)]
pub struct Args {
    /// 대상 확장자 (예: .py .js, 점은 생략 가능)
    #[arg(required = true, value_name = "EXT")]
    pub extensions: Vec<String>,

    /// 탐색할 소스 폴더
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// 스테이징 폴더 (기본값: <source>/CodeTextify/TXTs)
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// 병합 결과 폴더 (기본값: <source>/CodeTextify/Merged)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// 출력 파일 하나의 최대 문자 수 (기본값: 75000)
    #[arg(short, long)]
    pub max_chars: Option<usize>,

    /// 출력 파일 이름 접두사 (기본값: MergedFile)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// 추가로 무시할 폴더 이름 (반복 가능)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    pub ignore_dirs: Vec<String>,

    /// 추가로 무시할 파일 이름 (반복 가능)
    #[arg(long = "ignore-file", value_name = "NAME")]
    pub ignore_files: Vec<String>,

    /// 내장 기본 무시 목록을 사용하지 않음
    #[arg(long)]
    pub no_default_ignores: bool,

    /// TOML 설정 파일
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 완료 후 출력 폴더 열기
    #[arg(long)]
    pub open: bool,

    /// 상세 출력 모드 (디버그 로그)
    #[arg(short, long)]
    pub verbose: bool,

    /// 파일 복사/병합 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// 쉼표로 이어 쓴 토큰도 분리한 확장자 목록 (예: ".py,.js")
    pub fn extension_tokens(&self) -> Vec<String> {
        self.extensions
            .iter()
            .flat_map(|e| e.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Config {
    /// CLI 인자로부터 설정 생성
    ///
    /// 설정 파일 값 위에 CLI 값을 덮어쓰며, 유효성 검사는 하지 않습니다.
    pub fn from_args(args: &Args) -> Result<Self> {
        let extensions = ExtensionMatcher::new(args.extension_tokens())?;

        let ignore = if args.no_default_ignores {
            IgnoreSet::empty()
        } else {
            IgnoreSet::defaults()
        };
        let mut config = Config::new(&args.source, extensions).with_ignore(ignore);

        if let Some(ref path) = args.config {
            config = config.apply_file(FileConfig::load(path)?)?;
        }

        if let Some(ref dir) = args.staging_dir {
            config = config.with_staging_dir(dir);
        }
        if let Some(ref dir) = args.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(max_chars) = args.max_chars {
            config = config.with_max_chars(max_chars);
        }
        if let Some(ref prefix) = args.prefix {
            config = config.with_output_prefix(prefix.clone());
        }

        let ignore = config
            .ignore
            .clone()
            .with_dirs(&args.ignore_dirs)
            .with_files(&args.ignore_files);
        Ok(config.with_ignore(ignore))
    }
}
