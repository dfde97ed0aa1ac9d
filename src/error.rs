//! 에러 타입 정의 모듈
//!
//! codetextify에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 설정 에러와 파일 시스템 변경 에러는 실행 전체를 중단시키고,
//! 파일 단위 에러(복사/읽기 실패, 바이너리 파일)는 호출 측에서 집계 후 건너뜁니다.

use std::path::PathBuf;
use thiserror::Error;

/// codetextify에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum CodeTextifyError {
    /// 소스 폴더가 존재하지 않음
    #[error("소스 폴더를 찾을 수 없습니다: {path}")]
    SourceNotFound { path: PathBuf },

    /// 소스 경로가 폴더가 아님
    #[error("소스 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 확장자가 하나도 지정되지 않음
    #[error("파일 확장자가 지정되지 않았습니다 (예: codetextify .py .js)")]
    NoExtensions,

    /// 최대 문자 수가 너무 작음
    #[error("max_chars 값이 너무 작습니다: {value} (최소 {min})")]
    InvalidMaxChars { value: usize, min: usize },

    /// 출력 파일 접두사가 유효하지 않음
    #[error("유효하지 않은 출력 파일 접두사: {prefix:?}")]
    InvalidPrefix { prefix: String },

    /// 작업 폴더가 소스 폴더와 같거나 소스 폴더를 포함함
    #[error("작업 폴더가 소스 폴더를 포함하므로 초기화할 수 없습니다: {path}")]
    UnsafeWorkDir { path: PathBuf },

    /// 스테이징 폴더와 출력 폴더가 같음
    #[error("스테이징 폴더와 출력 폴더가 같습니다: {path}")]
    SameWorkDirs { path: PathBuf },

    /// 알 수 없는 인코딩 이름
    #[error("알 수 없는 인코딩: {label}")]
    UnknownEncoding { label: String },

    /// 설정 파일 읽기 실패
    #[error("설정 파일을 읽을 수 없습니다 ({path}): {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    /// 설정 파일 파싱 실패
    #[error("설정 파일 파싱 실패 ({path}): {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// 폴더 삭제/생성 실패
    #[error("폴더 초기화 실패 ({path}): {reason}")]
    FolderReset { path: PathBuf, reason: String },

    /// 파일 복사 실패
    #[error("파일 복사 실패 ({file}): {reason}")]
    CopyError { file: PathBuf, reason: String },

    /// 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    ReadError { file: PathBuf, reason: String },

    /// 바이너리 파일로 판정됨
    #[error("바이너리 파일로 판정되어 건너뜁니다: {file}")]
    BinaryFile { file: PathBuf },

    /// 파일 맵 직렬화 실패
    #[error("파일 맵 직렬화 실패 ({path}): {reason}")]
    MapSerialize { path: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {reason}")]
    WriteError { path: PathBuf, reason: String },

    /// 스테이징된 파일 없음
    #[error("복사된 파일이 없습니다. 확장자와 소스 폴더를 확인하세요")]
    NothingStaged,

    /// 병합할 파일 없음
    #[error("병합할 파일이 없습니다")]
    NoFilesToMerge,
}

/// codetextify 결과 타입 별칭
pub type Result<T> = std::result::Result<T, CodeTextifyError>;
