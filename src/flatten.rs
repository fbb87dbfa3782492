//! 평탄화 모듈
//!
//! 중첩된 JSON 값을 한 단계짜리 키/값 레코드로 펼칩니다.
//! 중첩 키는 구분자로 이어 붙이고 (`a.b.c`), 배열 처리 방식은
//! [`ArrayStrategy`]로 선택합니다.

use clap::ValueEnum;
use serde_json::{Map, Value};

/// 평탄화된 레코드 (복합 키 → 스칼라 값)
///
/// `serde_json::Map`은 키 순서로 정렬되므로 같은 입력에 대해 항상 같은 결과를 냅니다.
pub type FlatRecord = Map<String, Value>;

/// 기본 키 구분자
pub const DEFAULT_SEPARATOR: &str = ".";

/// 스칼라 배열을 합칠 때 쓰는 구분자
pub const JOIN_DELIMITER: &str = ",";

/// 배열 평탄화 방식
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ArrayStrategy {
    /// 모든 요소가 객체면 인덱스별로 펼치고, 아니면 요소들을 쉼표로 합친 문자열 하나로 저장
    #[default]
    Join,
    /// 요소 종류와 관계없이 모든 요소를 `key.<index>` 형태로 펼침
    Index,
}

impl std::fmt::Display for ArrayStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrayStrategy::Join => write!(f, "Join"),
            ArrayStrategy::Index => write!(f, "Index"),
        }
    }
}

/// 평탄화 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattener {
    separator: String,
    arrays: ArrayStrategy,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            arrays: ArrayStrategy::default(),
        }
    }
}

impl Flattener {
    /// 기본 설정 생성 (구분자 ".", Join 방식)
    pub fn new() -> Self {
        Self::default()
    }

    /// 키 구분자 설정
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// 배열 처리 방식 설정
    pub fn with_arrays(mut self, arrays: ArrayStrategy) -> Self {
        self.arrays = arrays;
        self
    }

    /// 키 구분자
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// 배열 처리 방식
    pub fn arrays(&self) -> ArrayStrategy {
        self.arrays
    }

    /// JSON 값을 평탄화
    ///
    /// 객체는 각 필드를, 배열은 각 요소를 인덱스 키로 펼칩니다.
    /// 최상위 스칼라는 `{"value": ...}`로 감쌉니다.
    ///
    /// # Examples
    /// ```
    /// use jcsv::flatten::Flattener;
    /// use serde_json::json;
    ///
    /// let flat = Flattener::new().flatten(&json!({"a": {"b": 1, "c": 2}}));
    /// assert_eq!(flat.get("a.b"), Some(&json!(1)));
    /// assert_eq!(flat.get("a.c"), Some(&json!(2)));
    /// ```
    pub fn flatten(&self, value: &Value) -> FlatRecord {
        let mut out = FlatRecord::new();

        match value {
            Value::Object(map) => self.flatten_object(map, "", &mut out),
            Value::Array(arr) => {
                for (i, item) in arr.iter().enumerate() {
                    self.flatten_value(i.to_string(), item, &mut out);
                }
            }
            scalar => {
                out.insert("value".to_string(), scalar.clone());
            }
        }

        out
    }

    /// 객체 레코드를 평탄화
    pub fn flatten_record(&self, record: &Map<String, Value>) -> FlatRecord {
        let mut out = FlatRecord::new();
        self.flatten_object(record, "", &mut out);
        out
    }

    fn flatten_object(&self, map: &Map<String, Value>, parent: &str, out: &mut FlatRecord) {
        for (key, value) in map {
            self.flatten_value(self.compose(parent, key), value, out);
        }
    }

    fn flatten_value(&self, key: String, value: &Value, out: &mut FlatRecord) {
        match value {
            Value::Object(map) => self.flatten_object(map, &key, out),
            Value::Array(arr) => match self.arrays {
                ArrayStrategy::Join if !arr.iter().all(Value::is_object) => {
                    out.insert(key, Value::String(join_elements(arr)));
                }
                _ => {
                    for (i, item) in arr.iter().enumerate() {
                        self.flatten_value(self.compose(&key, &i.to_string()), item, out);
                    }
                }
            },
            scalar => {
                out.insert(key, scalar.clone());
            }
        }
    }

    fn compose(&self, parent: &str, key: &str) -> String {
        if parent.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", parent, self.separator, key)
        }
    }
}

/// 배열 요소들을 쉼표로 합친 문자열
///
/// 문자열은 그대로, 나머지는 JSON 표기(`true`, `1.5`, `null`, `{"a":1}`)로 씁니다.
fn join_elements(arr: &[Value]) -> String {
    arr.iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(JOIN_DELIMITER)
}
