//! 스테이징 파일 읽기 모듈
//!
//! 인코딩을 순서대로 엄격하게 시도하고, 모두 실패하면 앞부분 1KB에 널 바이트가 있는지 보고
//! 바이너리로 판정하거나 UTF-8 손실 디코딩(U+FFFD 치환)으로 대체합니다.

use encoding_rs::Encoding;
use std::fs;
use std::path::Path;

use crate::error::{CodeTextifyError, Result};

/// 바이너리 판정에 사용하는 앞부분 바이트 수
pub const BINARY_SNIFF_LEN: usize = 1024;

/// 디코딩 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// 텍스트로 디코딩됨
    Text {
        content: String,
        /// 사용된 인코딩 이름
        encoding: &'static str,
        /// 손실 대체 디코딩 여부
        lossy: bool,
    },
    /// 바이너리 파일 (건너뜀)
    Binary,
}

impl Decoded {
    fn text(content: String, encoding: &'static Encoding, lossy: bool) -> Self {
        Decoded::Text {
            content,
            encoding: encoding.name(),
            lossy,
        }
    }
}

/// 파일을 읽어 디코딩
///
/// # Arguments
/// * `path` - 읽을 파일
/// * `encodings` - 엄격 디코딩을 시도할 인코딩 순서
pub fn read_text(path: &Path, encodings: &[&'static Encoding]) -> Result<Decoded> {
    let bytes = fs::read(path).map_err(|e| CodeTextifyError::ReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(decode_bytes(&bytes, encodings))
}

/// 바이트열 디코딩
///
/// 1. BOM이 있으면 BOM이 가리키는 인코딩
/// 2. `encodings`를 순서대로 엄격 디코딩
/// 3. 앞부분 1KB에 널 바이트가 있으면 바이너리
/// 4. 그 외에는 UTF-8 손실 디코딩
pub fn decode_bytes(bytes: &[u8], encodings: &[&'static Encoding]) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        {
            return Decoded::text(text.into_owned(), encoding, false);
        }
    }

    for &encoding in encodings {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Decoded::text(text.into_owned(), encoding, false);
        }
    }

    if looks_binary(bytes) {
        return Decoded::Binary;
    }

    let (text, _) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    Decoded::text(text.into_owned(), encoding_rs::UTF_8, true)
}

/// 앞부분 1KB에 널 바이트가 있는지 확인
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}
