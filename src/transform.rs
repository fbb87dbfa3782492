//! 필드 변환 모듈
//!
//! 평탄화 이후, CSV 직렬화 이전에 특정 열의 값을 바꾸는 함수를 등록합니다.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{JcsvError, Result};
use crate::flatten::FlatRecord;

/// 스칼라 값 변환 함수
pub type TransformFn = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// 필드 이름 → 변환 함수 레지스트리
#[derive(Default)]
pub struct Transforms {
    by_field: BTreeMap<String, TransformFn>,
}

impl fmt::Debug for Transforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transforms")
            .field("fields", &self.by_field.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Transforms {
    /// 빈 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드에 변환 함수 등록 (같은 필드에 다시 등록하면 교체)
    pub fn register<F>(mut self, field: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.by_field.insert(field.into(), Box::new(transform));
        self
    }

    /// 내장 변환을 이름으로 등록
    pub fn register_builtin(self, field: impl Into<String>, name: &str) -> Result<Self> {
        let transform = builtin(name).ok_or_else(|| JcsvError::UnknownTransform {
            name: name.to_string(),
        })?;
        Ok(self.register(field, transform))
    }

    /// 등록된 변환이 없는지 확인
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// 레코드에 변환 적용 (레코드에 없는 필드는 건드리지 않음)
    pub fn apply(&self, record: &mut FlatRecord) {
        for (field, transform) in &self.by_field {
            if let Some(value) = record.get_mut(field) {
                *value = transform(value);
            }
        }
    }
}

/// 내장 변환 함수 조회
///
/// - `upper` / `lower` / `trim`: 문자열에만 적용, 나머지는 그대로
/// - `length`: 문자열 글자 수, 나머지는 그대로
pub fn builtin(name: &str) -> Option<fn(&Value) -> Value> {
    let f: fn(&Value) -> Value = match name {
        "upper" => upper,
        "lower" => lower,
        "trim" => trim,
        "length" => length,
        _ => return None,
    };
    Some(f)
}

fn upper(value: &Value) -> Value {
    map_str(value, |s| Value::String(s.to_uppercase()))
}

fn lower(value: &Value) -> Value {
    map_str(value, |s| Value::String(s.to_lowercase()))
}

fn trim(value: &Value) -> Value {
    map_str(value, |s| Value::String(s.trim().to_string()))
}

fn length(value: &Value) -> Value {
    map_str(value, |s| Value::from(s.chars().count()))
}

fn map_str(value: &Value, f: impl Fn(&str) -> Value) -> Value {
    match value {
        Value::String(s) => f(s),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FlatRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_apply_registered_transform() {
        let transforms = Transforms::new().register("price", |v| {
            v.as_f64().map(|p| json!(p * 2.0)).unwrap_or(Value::Null)
        });
        let mut row = record(json!({"price": 1.5, "name": "x"}));
        transforms.apply(&mut row);

        assert_eq!(Value::Object(row), json!({"price": 3.0, "name": "x"}));
    }

    #[test]
    fn test_missing_field_left_absent() {
        let transforms = Transforms::new().register("price", |_| json!(0));
        let mut row = record(json!({"name": "x"}));
        transforms.apply(&mut row);

        assert_eq!(Value::Object(row), json!({"name": "x"}));
    }

    #[test]
    fn test_builtin_transforms() {
        let transforms = Transforms::new()
            .register_builtin("a", "upper")
            .unwrap()
            .register_builtin("b", "trim")
            .unwrap()
            .register_builtin("c", "length")
            .unwrap()
            .register_builtin("d", "lower")
            .unwrap();
        let mut row = record(json!({"a": "abc", "b": "  x ", "c": "héllo", "d": 5}));
        transforms.apply(&mut row);

        assert_eq!(
            Value::Object(row),
            json!({"a": "ABC", "b": "x", "c": 5, "d": 5})
        );
    }

    #[test]
    fn test_unknown_builtin() {
        let result = Transforms::new().register_builtin("a", "reverse");
        assert!(matches!(result, Err(JcsvError::UnknownTransform { .. })));
    }
}
