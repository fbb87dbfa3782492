//! 에러 타입 정의 모듈
//!
//! jcsv에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 결과가 비어 있는 경우(쓸 레코드 없음)는 에러가 아니라
//! [`crate::table::WriteOutcome::Empty`]로 표현됩니다.

use std::path::PathBuf;
use thiserror::Error;

/// jcsv에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum JcsvError {
    /// JSON 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// 유효하지 않은 JSON 문서
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    MalformedInput { file: PathBuf, reason: String },

    /// 중첩 키 경로를 따라갈 수 없음
    #[error("키 경로 '{path}'를 찾을 수 없습니다 (세그먼트: '{segment}')")]
    PathNotFound { path: String, segment: String },

    /// 병합 대상 문서들의 최상위 타입 불일치
    #[error("JSON 최상위 타입이 일치하지 않습니다 ({file}): {expected} 예상, {found} 발견")]
    InconsistentRootType {
        file: PathBuf,
        expected: &'static str,
        found: &'static str,
    },

    /// 병합할 수 없는 최상위 타입 (객체/배열 이외)
    #[error("지원하지 않는 JSON 최상위 타입입니다 ({file}): {found}")]
    UnsupportedRootType { file: PathBuf, found: &'static str },

    /// 처리할 파일 없음
    #[error("처리할 JSON 파일이 없습니다: {path}")]
    NoFilesFound { path: PathBuf },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 유효하지 않은 JSONPath 표현식
    #[error("유효하지 않은 JSONPath 표현식 '{expr}': {reason}")]
    InvalidQuery { expr: String, reason: String },

    /// 유효하지 않은 필드 지정
    #[error("유효하지 않은 필드 지정: '{spec}'")]
    InvalidFieldSpec { spec: String },

    /// 알 수 없는 변환 이름
    #[error("알 수 없는 변환: '{name}'")]
    UnknownTransform { name: String },

    /// 여러 입력을 합치지 않고 하나의 출력 경로로 변환하려 함
    #[error("입력 {inputs} 개를 하나의 출력 경로로 변환할 수 없습니다 (합치기를 사용하세요)")]
    AmbiguousOutput { inputs: usize },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    WriteError { file: PathBuf, reason: String },
}

/// jcsv 결과 타입 별칭
pub type Result<T> = std::result::Result<T, JcsvError>;

/// JSON 값의 최상위 타입 이름
pub fn type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
