//! JSON 파일 로딩 모듈
//!
//! 문서 전체를 메모리에 읽어 파싱합니다. 큰 파일은 메모리 매핑을 사용합니다.

use memmap2::Mmap;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{JcsvError, Result};

/// 메모리 매핑을 사용할 파일 크기 임계값 (10MB)
pub const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

/// 로드된 JSON 문서
#[derive(Debug, Clone)]
pub struct Document {
    /// 파싱된 값
    pub value: Value,
    /// 원본 파일 크기
    pub file_size: u64,
}

/// JSON 파일 로드
///
/// # Arguments
/// * `path` - 읽을 JSON 파일 경로
///
/// # Returns
/// 파싱된 문서, 또는 파일 열기/파싱 실패 에러
pub fn load_json(path: &Path) -> Result<Document> {
    load_json_with_threshold(path, MMAP_THRESHOLD)
}

/// 메모리 매핑 임계값을 지정하여 JSON 파일 로드
pub fn load_json_with_threshold(path: &Path, mmap_threshold: u64) -> Result<Document> {
    let open_error = |e: std::io::Error| JcsvError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = File::open(path).map_err(open_error)?;
    let file_size = file.metadata().map_err(open_error)?.len();

    let value = if file_size >= mmap_threshold && file_size > 0 {
        tracing::debug!(path = %path.display(), file_size, "parsing with memory map");
        parse_with_mmap(path, &file)?
    } else {
        parse_with_reader(path, file)?
    };

    Ok(Document { value, file_size })
}

/// 버퍼 리더를 사용한 JSON 파싱
fn parse_with_reader(path: &Path, file: File) -> Result<Value> {
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| JcsvError::MalformedInput {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 메모리 매핑을 사용한 JSON 파싱 (대용량 파일용)
fn parse_with_mmap(path: &Path, file: &File) -> Result<Value> {
    let mmap = unsafe {
        Mmap::map(file).map_err(|e| JcsvError::FileOpenError {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?
    };

    serde_json::from_slice(&mmap).map_err(|e| JcsvError::MalformedInput {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}
