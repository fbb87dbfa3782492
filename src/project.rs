//! 키 선택/이름 변경 모듈
//!
//! 레코드에서 원하는 필드만 골라내거나 필드 이름을 바꿉니다.
//!
//! 선택(filter)과 이름 변경(rename)은 없는 키를 다르게 다룹니다.
//! 선택은 요청한 모든 키를 `null`로라도 채우고, 이름 변경은 없는 키를 건너뜁니다.

use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::JcsvError;
use crate::path::{resolve_in, KeyPath};

/// 출력 필드 지정
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// 키 또는 점 경로를 그대로 열 이름으로 사용
    Key(String),
    /// 원본 키/경로를 다른 열 이름으로 복사
    Rename { from: String, to: String },
}

impl FromStr for FieldSpec {
    type Err = JcsvError;

    /// `"user.name"` 또는 `"user.name=name"` 형식 파싱
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || JcsvError::InvalidFieldSpec {
            spec: s.to_string(),
        };

        match s.split_once('=') {
            Some((from, to)) => {
                let (from, to) = (from.trim(), to.trim());
                if from.is_empty() || to.is_empty() {
                    return Err(invalid());
                }
                Ok(FieldSpec::Rename {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
            None => {
                let key = s.trim();
                if key.is_empty() {
                    return Err(invalid());
                }
                Ok(FieldSpec::Key(key.to_string()))
            }
        }
    }
}

/// 쉼표로 구분된 필드 지정 목록 파싱 (빈 항목은 무시)
///
/// # Examples
/// ```
/// use jcsv::project::{parse_field_specs, FieldSpec};
///
/// let specs = parse_field_specs("id, user.name=name").unwrap();
/// assert_eq!(specs[0], FieldSpec::Key("id".to_string()));
/// assert_eq!(
///     specs[1],
///     FieldSpec::Rename { from: "user.name".to_string(), to: "name".to_string() }
/// );
/// ```
pub fn parse_field_specs(input: &str) -> Result<Vec<FieldSpec>, JcsvError> {
    input
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// 요청한 키만 남기기
///
/// 요청한 키는 항상 결과에 포함됩니다. 레코드에 그대로 있으면 복사하고,
/// 점 경로면 원본 객체를 따라 탐색하며, 둘 다 실패하면 `null`을 넣습니다.
/// 점 경로로 찾은 값은 요청한 문자열 그대로를 키로 저장합니다.
pub fn filter_keys(record: &Map<String, Value>, keys: &[String]) -> Map<String, Value> {
    let mut filtered = Map::new();

    for key in keys {
        let value = lookup(record, key).cloned().unwrap_or(Value::Null);
        filtered.insert(key.clone(), value);
    }

    filtered
}

/// 키 이름 바꾸기
///
/// 원본 키가 있는 쌍만 결과에 들어갑니다. 없는 키는 `null`로 채우지 않고 생략합니다.
pub fn rename_keys(record: &Map<String, Value>, mapping: &[(String, String)]) -> Map<String, Value> {
    let mut renamed = Map::new();

    for (from, to) in mapping {
        if let Some(value) = lookup(record, from) {
            renamed.insert(to.clone(), value.clone());
        }
    }

    renamed
}

/// 필드 지정 목록 적용
///
/// `Key`는 [`filter_keys`], `Rename`은 [`rename_keys`] 규칙을 따르며
/// 두 결과를 하나의 레코드로 합칩니다.
pub fn project(record: &Map<String, Value>, specs: &[FieldSpec]) -> Map<String, Value> {
    let (keys, mapping) = split_specs(specs);

    let mut projected = filter_keys(record, &keys);
    projected.extend(rename_keys(record, &mapping));
    projected
}

/// 필드 지정을 선택 키와 이름 변경 쌍으로 분리
pub fn split_specs(specs: &[FieldSpec]) -> (Vec<String>, Vec<(String, String)>) {
    let mut keys = Vec::new();
    let mut mapping = Vec::new();

    for spec in specs {
        match spec {
            FieldSpec::Key(key) => keys.push(key.clone()),
            FieldSpec::Rename { from, to } => mapping.push((from.clone(), to.clone())),
        }
    }

    (keys, mapping)
}

/// 키를 그대로 찾고, 없으면 점 경로로 탐색
fn lookup<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(key) {
        return Some(value);
    }

    if !key.contains('.') {
        return None;
    }

    match resolve_in(record, &KeyPath::parse(key)) {
        Ok(value) => Some(value),
        Err(failure) => {
            tracing::debug!(key, segment = %failure.segment, "nested key not found");
            None
        }
    }
}
