//! 후처리 훅 모듈
//!
//! 병합이 끝난 뒤 실행되는 선택적 동작입니다. 결과의 정확성은 훅에 의존하지 않으며,
//! 훅이 실패해도 경고만 남깁니다.

use std::io;
use std::path::Path;
use std::process::Command;

/// 병합 완료 후 호출되는 훅
pub trait PostProcessHook {
    /// 훅 이름 (로그용)
    fn name(&self) -> &str;

    /// 출력 폴더를 받아 후처리 수행
    fn after_merge(&self, output_dir: &Path) -> io::Result<()>;
}

/// 아무것도 하지 않는 훅
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl PostProcessHook for NoopHook {
    fn name(&self) -> &str {
        "noop"
    }

    fn after_merge(&self, _output_dir: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// 플랫폼 파일 탐색기로 출력 폴더를 여는 훅
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenFolderHook;

impl OpenFolderHook {
    fn opener() -> &'static str {
        if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl PostProcessHook for OpenFolderHook {
    fn name(&self) -> &str {
        "open-folder"
    }

    fn after_merge(&self, output_dir: &Path) -> io::Result<()> {
        if !output_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("출력 폴더가 없습니다: {}", output_dir.display()),
            ));
        }
        // explorer는 성공해도 0이 아닌 종료 코드를 돌려주므로 실행 여부만 확인
        Command::new(Self::opener()).arg(output_dir).spawn()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_noop_hook_always_succeeds() {
        assert!(NoopHook.after_merge(Path::new("/nowhere")).is_ok());
    }

    #[test]
    fn test_open_folder_requires_existing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let err = OpenFolderHook.after_merge(&missing).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
