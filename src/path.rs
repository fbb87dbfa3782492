//! 키 경로 모듈
//!
//! 점(`.`)으로 구분된 경로를 따라 JSON 값을 탐색합니다.
//! 객체에서는 키로, 배열에서는 숫자 인덱스로 내려갑니다.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::JcsvError;

/// 점으로 구분된 키 경로 (예: "data.items.0.name")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    raw: String,
    segments: Vec<String>,
}

impl KeyPath {
    /// 경로 문자열을 세그먼트로 분리
    ///
    /// 빈 문자열은 세그먼트가 없는 경로가 되며 원래 값으로 해석됩니다.
    ///
    /// # Examples
    /// ```
    /// use jcsv::path::KeyPath;
    ///
    /// let path = KeyPath::parse("user.tags.0");
    /// assert_eq!(path.segments(), ["user", "tags", "0"]);
    /// assert!(KeyPath::parse("").is_empty());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let segments = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split('.').map(str::to_string).collect()
        };

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// 세그먼트 목록
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 세그먼트가 없는지 확인
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 원본 경로 문자열
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 경로 탐색 실패 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    /// 전체 경로
    pub path: String,
    /// 해석에 실패한 세그먼트
    pub segment: String,
}

impl From<LookupFailure> for JcsvError {
    fn from(failure: LookupFailure) -> Self {
        JcsvError::PathNotFound {
            path: failure.path,
            segment: failure.segment,
        }
    }
}

/// 키 경로를 따라 값 탐색
///
/// # Arguments
/// * `value` - 탐색할 JSON 값
/// * `path` - 키 경로
///
/// # Returns
/// 경로 끝의 값 또는 처음으로 해석하지 못한 세그먼트를 담은 `LookupFailure`
pub fn resolve<'a>(value: &'a Value, path: &KeyPath) -> Result<&'a Value, LookupFailure> {
    walk(value, path.segments(), path)
}

/// 객체 레코드에서 시작하는 키 경로 탐색
///
/// 첫 세그먼트는 레코드의 키로, 나머지는 [`resolve`]와 같은 규칙으로 해석합니다.
/// 세그먼트가 없는 경로는 가리킬 값이 없으므로 실패합니다.
pub fn resolve_in<'a>(
    record: &'a Map<String, Value>,
    path: &KeyPath,
) -> Result<&'a Value, LookupFailure> {
    let failure = |segment: &str| LookupFailure {
        path: path.as_str().to_string(),
        segment: segment.to_string(),
    };

    let (first, rest) = path.segments().split_first().ok_or_else(|| failure(""))?;
    let root = record.get(first).ok_or_else(|| failure(first))?;
    walk(root, rest, path)
}

fn walk<'a>(
    value: &'a Value,
    segments: &[String],
    path: &KeyPath,
) -> Result<&'a Value, LookupFailure> {
    let mut current = value;

    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(arr) => parse_index(segment).and_then(|i| arr.get(i)),
            _ => None,
        };

        current = next.ok_or_else(|| LookupFailure {
            path: path.as_str().to_string(),
            segment: segment.clone(),
        })?;
    }

    Ok(current)
}

/// 배열 인덱스 세그먼트 파싱 (숫자만 허용, 부호 불가)
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
