//! 레코드 정규화 모듈
//!
//! 임의의 JSON 값을 출력 행 단위의 객체 목록으로 바꿉니다.

use serde_json::{Map, Value};

/// 스칼라 값을 감쌀 때 쓰는 키
pub const VALUE_KEY: &str = "value";

/// JSON 값을 객체 레코드 목록으로 정규화
///
/// - 배열: 요소 하나가 레코드 하나, 객체가 아닌 요소는 `{"value": 요소}`로 감쌈
/// - 객체: 객체 자체가 유일한 레코드
/// - 스칼라: `[{"value": 값}]`
///
/// # Examples
/// ```
/// use jcsv::normalize::normalize;
/// use serde_json::json;
///
/// let records = normalize(json!([{"id": 1}, 2]));
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].get("value"), Some(&json!(2)));
/// ```
pub fn normalize(value: Value) -> Vec<Map<String, Value>> {
    match value {
        Value::Array(arr) => arr.into_iter().map(into_record).collect(),
        other => vec![into_record(other)],
    }
}

/// 객체는 그대로, 그 외는 `{"value": ...}`로 감싸기
fn into_record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert(VALUE_KEY.to_string(), other);
            map
        }
    }
}
