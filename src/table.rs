//! CSV 직렬화 모듈
//!
//! 서로 다른 키를 가진 레코드들을 하나의 CSV 표로 만들고 파일에 씁니다.
//! 헤더는 모든 레코드 키의 합집합(사전순)이며, 레코드에 없는 키는 빈 칸이 됩니다.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::cli::WriteMode;
use crate::error::{JcsvError, Result};

/// 헤더와 행으로 구성된 CSV 표
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    header: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl CsvTable {
    /// 레코드 목록으로 표 생성 (헤더는 매번 새로 계산)
    pub fn new(rows: Vec<Map<String, Value>>) -> Self {
        let header: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
        let header = header.into_iter().cloned().collect();

        Self { header, rows }
    }

    /// 정렬된 헤더
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// 행 수
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 행이 없는지 확인
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 헤더 순서에 맞춘 셀 문자열 행들
    pub fn cells(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(move |row| {
            self.header
                .iter()
                .map(|key| row.get(key).map(cell_text).unwrap_or_default())
                .collect()
        })
    }

    /// 임의의 writer에 CSV 출력 (헤더 + 행, CRLF 줄바꿈)
    pub fn write_to<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);

        csv_writer.write_record(&self.header)?;
        for row in self.cells() {
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;

        Ok(())
    }

    /// CSV 문서를 바이트로 생성
    pub fn to_bytes(&self) -> csv::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// 스칼라 값을 CSV 셀 문자열로 변환
///
/// # Examples
/// ```
/// use jcsv::table::cell_text;
/// use serde_json::json;
///
/// assert_eq!(cell_text(&json!(null)), "");
/// assert_eq!(cell_text(&json!(true)), "true");
/// assert_eq!(cell_text(&json!(2.5)), "2.5");
/// assert_eq!(cell_text(&json!("a,b")), "a,b");
/// assert_eq!(cell_text(&json!({"k": 1})), r#"{"k":1}"#);
/// ```
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// CSV 쓰기 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// 파일 생성 완료
    Written {
        path: PathBuf,
        rows: usize,
        columns: usize,
        bytes: u64,
    },
    /// 쓸 레코드가 없어 파일을 만들지 않음
    Empty,
}

impl WriteOutcome {
    /// 생성된 파일 경로
    pub fn path(&self) -> Option<&Path> {
        match self {
            WriteOutcome::Written { path, .. } => Some(path),
            WriteOutcome::Empty => None,
        }
    }
}

/// 레코드 목록을 CSV 파일로 저장
///
/// 레코드가 없거나 모든 레코드에 열이 하나도 없으면
/// 경고만 남기고 파일을 만들지 않습니다.
pub fn write_csv(
    records: Vec<Map<String, Value>>,
    path: &Path,
    mode: WriteMode,
) -> Result<WriteOutcome> {
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "no records to write to CSV");
        return Ok(WriteOutcome::Empty);
    }

    let table = CsvTable::new(records);
    if table.header().is_empty() {
        tracing::warn!(
            path = %path.display(),
            rows = table.len(),
            "records have no columns, CSV not written"
        );
        return Ok(WriteOutcome::Empty);
    }

    let bytes = table.to_bytes().map_err(|e| JcsvError::WriteError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let written = write_atomic(path, &bytes, mode)?;

    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.header().len(),
        "CSV written"
    );

    Ok(WriteOutcome::Written {
        path: path.to_path_buf(),
        rows: table.len(),
        columns: table.header().len(),
        bytes: written,
    })
}

/// 임시 파일에 쓴 뒤 대상 경로로 rename
///
/// 중간에 실패하면 대상 경로에는 아무것도 남지 않습니다.
pub fn write_atomic(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<u64> {
    let write_error = |e: io::Error| JcsvError::WriteError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    };

    if mode == WriteMode::Error && path.exists() {
        return Err(JcsvError::OutputExists {
            path: path.to_path_buf(),
        });
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_error)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(bytes).map_err(write_error)?;
    temp.flush().map_err(write_error)?;

    let persisted = match mode {
        WriteMode::Overwrite => temp.persist(path),
        WriteMode::Error => temp.persist_noclobber(path),
    };
    persisted.map_err(|e| match e.error.kind() {
        io::ErrorKind::AlreadyExists => JcsvError::OutputExists {
            path: path.to_path_buf(),
        },
        _ => write_error(e.error),
    })?;

    Ok(bytes.len() as u64)
}
