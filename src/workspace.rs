//! 작업 폴더 초기화 모듈
//!
//! 실행마다 스테이징/출력 폴더를 통째로 지우고 다시 만듭니다 (병합이 아닌 재설정).

use std::fs;
use std::path::Path;

use crate::error::{CodeTextifyError, Result};

/// 폴더 삭제 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleared {
    /// 기존 폴더를 삭제함
    Removed,
    /// 폴더가 없어서 할 일이 없었음
    Absent,
}

/// 폴더와 그 내용을 삭제
pub fn clear_dir(path: &Path) -> Result<Cleared> {
    if !path.exists() {
        return Ok(Cleared::Absent);
    }
    fs::remove_dir_all(path).map_err(|e| CodeTextifyError::FolderReset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Cleared::Removed)
}

/// 폴더 생성 (상위 폴더 포함)
pub fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| CodeTextifyError::FolderReset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clear_then_create() {
        let temp_dir = TempDir::new().unwrap();
        let work = temp_dir.path().join("work/TXTs");
        create_dir(&work).unwrap();
        fs::write(work.join("old.txt"), "stale").unwrap();

        assert_eq!(clear_dir(&work).unwrap(), Cleared::Removed);
        assert!(!work.exists());
        assert_eq!(clear_dir(&work).unwrap(), Cleared::Absent);

        create_dir(&work).unwrap();
        assert!(work.is_dir());
        assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_file_in_place_of_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            clear_dir(&file),
            Err(CodeTextifyError::FolderReset { .. })
        ));
    }
}
