//! jcsv - JSON TO CSV CONVERTER
//!
//! 임의로 중첩된 JSON(객체, 배열, 스칼라 혼합)을 평탄한 표 레코드로 바꿔
//! CSV로 저장하는 CLI 도구이자 라이브러리입니다.
//!
//! # 주요 기능
//!
//! - 🧭 **키 경로 탐색**: `data.items.0` 같은 점 경로로 하위 데이터 추출
//! - 🪜 **평탄화**: 중첩 객체/배열을 `a.b.c`, `items.0.name` 형태의 열로 펼치기
//! - 🎯 **필드 선택/이름 변경**: 없는 열은 빈 값으로 채우거나(선택) 생략(이름 변경)
//! - 📋 **CSV 출력**: 모든 레코드 키의 합집합을 헤더로 사용
//! - 🗂️ **합치기/병합**: 여러 JSON 파일을 하나의 CSV 또는 하나의 JSON으로
//! - 🔍 **JSONPath**: `$.store.book[*].author` 같은 쿼리로 데이터 선택
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! jcsv convert data.json -o result.csv
//!
//! # 중첩 데이터에서 특정 필드만 추출
//! jcsv convert data.json --nested-key data.items --fields "id,user.email=email"
//!
//! # 폴더 내 JSON 병합
//! jcsv merge -i ./json_folder -o merged.json
//! ```
//!
//! ```
//! use jcsv::{ConvertOptions, Converter};
//! use serde_json::json;
//!
//! let converter = Converter::new("csv_output");
//! let records = converter
//!     .build_records(json!({"items": [{"n": 1}, {"n": 2}]}), &ConvertOptions::new())
//!     .unwrap();
//! assert_eq!(records[0].get("items.1.n"), Some(&json!(2)));
//! ```

pub mod cli;
pub mod converter;
pub mod error;
pub mod flatten;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod path;
pub mod pattern;
pub mod project;
pub mod query;
pub mod stats;
pub mod table;
pub mod transform;

// Re-exports for convenient access
pub use cli::{Cli, Command, WriteMode};
pub use converter::{ConvertOptions, ConvertReport, Converter, SOURCE_FILE_KEY};
pub use error::{JcsvError, Result};
pub use flatten::{ArrayStrategy, FlatRecord, Flattener};
pub use merge::{merge_directory, merge_documents, MergeReport};
pub use normalize::normalize;
pub use path::{resolve, resolve_in, KeyPath, LookupFailure};
pub use pattern::{collect_json_files, PatternMatcher};
pub use project::{filter_keys, project, rename_keys, FieldSpec};
pub use stats::{format_bytes, Statistics};
pub use table::{cell_text, write_csv, CsvTable, WriteOutcome};
pub use transform::Transforms;
