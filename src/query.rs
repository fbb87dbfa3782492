//! JSONPath 쿼리 모듈
//!
//! `serde_json_path`로 JSONPath 표현식(키 탐색, `[*]`, 필터)을 평가합니다.

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::error::{JcsvError, Result};

/// JSONPath 표현식 컴파일
pub fn compile(expr: &str) -> Result<JsonPath> {
    JsonPath::parse(expr).map_err(|e| JcsvError::InvalidQuery {
        expr: expr.to_string(),
        reason: e.to_string(),
    })
}

/// 표현식과 일치하는 값들을 문서 순서대로 반환
///
/// # Examples
/// ```
/// use jcsv::query::query;
/// use serde_json::json;
///
/// let doc = json!({"store": {"book": [{"author": "A"}, {"author": "B"}]}});
/// let authors = query(&doc, "$.store.book[*].author").unwrap();
/// assert_eq!(authors, vec![json!("A"), json!("B")]);
/// ```
pub fn query(value: &Value, expr: &str) -> Result<Vec<Value>> {
    let path = compile(expr)?;
    let matches: Vec<Value> = path.query(value).all().into_iter().cloned().collect();

    tracing::debug!(expr, matches = matches.len(), "JSONPath query evaluated");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> Value {
        json!({
            "store": {
                "book": [
                    {"author": "Nigel Rees", "price": 8.95},
                    {"author": "Evelyn Waugh", "price": 12.99},
                    {"author": "Herman Melville", "price": 8.99}
                ]
            }
        })
    }

    #[test]
    fn test_wildcard() {
        let result = query(&store(), "$.store.book[*].author").unwrap();
        assert_eq!(
            result,
            vec![
                json!("Nigel Rees"),
                json!("Evelyn Waugh"),
                json!("Herman Melville")
            ]
        );
    }

    #[test]
    fn test_filter() {
        let result = query(&store(), "$.store.book[?@.price < 10].author").unwrap();
        assert_eq!(result, vec![json!("Nigel Rees"), json!("Herman Melville")]);
    }

    #[test]
    fn test_no_match() {
        assert!(query(&store(), "$.store.magazine").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_expression() {
        let result = query(&store(), "$.store[");
        assert!(matches!(result, Err(JcsvError::InvalidQuery { .. })));
    }
}
