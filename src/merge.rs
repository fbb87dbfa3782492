//! JSON 병합 모듈
//!
//! 여러 JSON 문서를 하나로 합칩니다.
//! 객체 문서는 키 단위로 얕게 병합(뒤 문서가 우선)하고, 배열 문서는 순서대로 이어 붙입니다.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::cli::WriteMode;
use crate::error::{type_name, JcsvError, Result};
use crate::loader::load_json;
use crate::pattern::{collect_json_files, PatternMatcher};
use crate::table::write_atomic;

/// 병합 결과 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// 출력 파일 경로
    pub output: PathBuf,
    /// 병합된 파일 수
    pub files: usize,
    /// 읽은 바이트
    pub bytes_read: u64,
    /// 쓴 바이트
    pub bytes_written: u64,
}

/// 병합 중인 문서
enum Merged {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl Merged {
    /// 첫 문서의 최상위 타입으로 빈 병합 대상 생성
    fn for_root(file: &Path, value: &Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(Merged::Object(Map::new())),
            Value::Array(_) => Ok(Merged::Array(Vec::new())),
            other => Err(JcsvError::UnsupportedRootType {
                file: file.to_path_buf(),
                found: type_name(other),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Merged::Object(_) => "object",
            Merged::Array(_) => "array",
        }
    }
}

/// 문서 목록 병합
///
/// 첫 문서의 최상위 타입이 기준이 되며, 다른 타입의 문서가 나오면
/// 해당 문서 경로를 담은 `InconsistentRootType` 에러를 반환합니다.
pub fn merge_documents<I>(documents: I) -> Result<Value>
where
    I: IntoIterator<Item = (PathBuf, Value)>,
{
    let mut merged: Option<Merged> = None;

    for (file, value) in documents {
        let mut acc = match merged.take() {
            Some(acc) => acc,
            None => Merged::for_root(&file, &value)?,
        };

        match (&mut acc, value) {
            (Merged::Object(map), Value::Object(other)) => map.extend(other),
            (Merged::Array(items), Value::Array(other)) => items.extend(other),
            (acc, value) => {
                return Err(JcsvError::InconsistentRootType {
                    file,
                    expected: acc.kind(),
                    found: type_name(&value),
                })
            }
        }

        merged = Some(acc);
    }

    Ok(match merged {
        Some(Merged::Object(map)) => Value::Object(map),
        Some(Merged::Array(items)) => Value::Array(items),
        None => Value::Null,
    })
}

/// 폴더 안의 JSON 파일들을 병합하여 저장
///
/// 모든 문서를 읽고 병합을 마친 뒤에만 출력 파일을 씁니다.
pub fn merge_directory(
    dir: &Path,
    output: &Path,
    max_depth: usize,
    matcher: &PatternMatcher,
    mode: WriteMode,
) -> Result<MergeReport> {
    let files = collect_json_files(dir, max_depth, matcher)?;
    if files.is_empty() {
        return Err(JcsvError::NoFilesFound {
            path: dir.to_path_buf(),
        });
    }

    let mut bytes_read = 0;
    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        let doc = load_json(file)?;
        bytes_read += doc.file_size;
        documents.push((file.clone(), doc.value));
    }

    let merged = merge_documents(documents)?;
    let bytes = to_pretty_json(&merged)?;
    let bytes_written = write_atomic(output, &bytes, mode)?;

    tracing::info!(
        files = files.len(),
        output = %output.display(),
        "merged JSON files"
    );

    Ok(MergeReport {
        output: output.to_path_buf(),
        files: files.len(),
        bytes_read,
        bytes_written,
    })
}

/// 4칸 들여쓰기 JSON 직렬화
fn to_pretty_json(value: &Value) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

    value
        .serialize(&mut serializer)
        .map_err(|e| JcsvError::WriteError {
            file: PathBuf::from("<merged>"),
            reason: e.to_string(),
        })?;

    Ok(buffer)
}
