//! JSON → CSV 변환 모듈
//!
//! 변환 파이프라인을 조립합니다.
//!
//! ```text
//! JSON 문서 → (중첩 키 추출 | JSONPath) → 정규화 → (필드 선택/이름 변경)
//!           → (평탄화) → (열 변환) → CSV
//! ```

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cli::WriteMode;
use crate::error::{JcsvError, Result};
use crate::flatten::{FlatRecord, Flattener};
use crate::loader::load_json;
use crate::normalize::normalize;
use crate::path::{resolve, KeyPath};
use crate::project::{project, rename_keys, FieldSpec};
use crate::query::query;
use crate::table::{write_csv, WriteOutcome};
use crate::transform::Transforms;

/// 여러 파일을 합칠 때 원본 파일 이름을 담는 열
pub const SOURCE_FILE_KEY: &str = "_source_file";

/// 변환 옵션
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 출력 필드 지정 (None이면 전체)
    pub fields: Option<Vec<FieldSpec>>,
    /// 변환할 데이터 위치 (점 경로)
    pub nested_key_path: Option<String>,
    /// 변환할 데이터를 고르는 JSONPath 표현식
    pub query: Option<String>,
    /// 평탄화 설정 (None이면 평탄화하지 않음)
    pub flatten: Option<Flattener>,
    /// 출력 파일 모드
    pub mode: WriteMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            fields: None,
            nested_key_path: None,
            query: None,
            flatten: Some(Flattener::default()),
            mode: WriteMode::default(),
        }
    }
}

impl ConvertOptions {
    /// 기본 옵션 생성 (기본 설정으로 평탄화)
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 선택 옵션 설정
    pub fn with_fields(mut self, fields: Option<Vec<FieldSpec>>) -> Self {
        self.fields = fields;
        self
    }

    /// 중첩 데이터 경로 설정
    pub fn with_nested_key_path(mut self, path: Option<String>) -> Self {
        self.nested_key_path = path;
        self
    }

    /// JSONPath 표현식 설정
    pub fn with_query(mut self, expr: Option<String>) -> Self {
        self.query = expr;
        self
    }

    /// 평탄화 설정
    pub fn with_flatten(mut self, flatten: Option<Flattener>) -> Self {
        self.flatten = flatten;
        self
    }

    /// 출력 파일 모드 설정
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }
}

/// 변환 결과 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    /// 입력 파일들
    pub inputs: Vec<PathBuf>,
    /// 읽은 바이트
    pub bytes_read: u64,
    /// 쓰기 결과
    pub outcome: WriteOutcome,
}

impl ConvertReport {
    /// 생성된 CSV 경로 (레코드가 없었으면 None)
    pub fn output(&self) -> Option<&Path> {
        self.outcome.path()
    }
}

/// JSON → CSV 변환기
#[derive(Debug)]
pub struct Converter {
    output_dir: PathBuf,
    transforms: Transforms,
}

impl Converter {
    /// 새 변환기 생성
    ///
    /// # Arguments
    /// * `output_dir` - 출력 경로를 지정하지 않았을 때 CSV를 저장할 폴더 (필요할 때 생성)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            transforms: Transforms::new(),
        }
    }

    /// 열 변환 레지스트리 설정
    pub fn with_transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }

    /// JSON 값을 CSV 행 레코드로 변환 (파일 입출력 없음)
    ///
    /// 중첩 키 경로를 찾지 못하면 `PathNotFound` 에러를 반환합니다.
    pub fn build_records(&self, value: Value, options: &ConvertOptions) -> Result<Vec<FlatRecord>> {
        let data = extract(value, options)?;
        let mut records = normalize(data);

        if let Some(ref fields) = options.fields {
            records = records.iter().map(|r| project(r, fields)).collect();
        }

        Ok(self.finish(records, options.flatten.as_ref()))
    }

    /// 단일 JSON 파일을 CSV로 변환
    ///
    /// # Arguments
    /// * `input` - JSON 파일 경로
    /// * `output` - CSV 경로 (None이면 `<출력 폴더>/<이름>_<타임스탬프>.csv`)
    /// * `options` - 변환 옵션
    pub fn convert_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        options: &ConvertOptions,
    ) -> Result<ConvertReport> {
        let doc = load_json(input)?;
        let records = self.build_records(doc.value, options)?;

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output(input, None));
        let outcome = write_csv(records, &output, options.mode)?;

        Ok(ConvertReport {
            inputs: vec![input.to_path_buf()],
            bytes_read: doc.file_size,
            outcome,
        })
    }

    /// 키 이름을 바꿔 CSV로 변환
    ///
    /// 매핑에 있는 키만 출력되며, 원본에 없는 키는 생략됩니다.
    pub fn convert_with_key_mapping(
        &self,
        input: &Path,
        mapping: &[(String, String)],
        output: Option<&Path>,
        mode: WriteMode,
    ) -> Result<ConvertReport> {
        let doc = load_json(input)?;
        let records: Vec<FlatRecord> = normalize(doc.value)
            .iter()
            .map(|r| rename_keys(r, mapping))
            .collect();
        let records = self.finish(records, None);

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output(input, Some("mapped")));
        let outcome = write_csv(records, &output, mode)?;

        Ok(ConvertReport {
            inputs: vec![input.to_path_buf()],
            bytes_read: doc.file_size,
            outcome,
        })
    }

    /// 여러 JSON 파일을 하나의 CSV로 합치기
    ///
    /// 각 행에 원본 파일 이름(`_source_file`)을 기록합니다.
    /// 파일 하나라도 읽지 못하면 아무것도 쓰지 않고 에러를 반환합니다.
    pub fn combine_files(
        &self,
        inputs: &[PathBuf],
        output: Option<&Path>,
        options: &ConvertOptions,
    ) -> Result<ConvertReport> {
        let mut combined = Vec::new();
        let mut bytes_read = 0;

        for input in inputs {
            let doc = load_json(input)?;
            bytes_read += doc.file_size;

            let source = file_name(input);
            let mut records = self.build_records(doc.value, options)?;
            for record in &mut records {
                record.insert(SOURCE_FILE_KEY.to_string(), Value::String(source.clone()));
            }

            tracing::debug!(input = %input.display(), records = records.len(), "records loaded");
            combined.extend(records);
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_dir.join(format!("combined_{}.csv", timestamp())));
        let outcome = write_csv(combined, &output, options.mode)?;

        Ok(ConvertReport {
            inputs: inputs.to_vec(),
            bytes_read,
            outcome,
        })
    }

    /// 여러 JSON 파일 변환
    ///
    /// `combine`이면 하나의 CSV로 합치고, 아니면 파일마다 CSV를 만듭니다.
    /// 출력 경로는 합치거나 입력이 하나일 때만 지정할 수 있습니다.
    /// 파일별 변환은 첫 실패에서 멈추며, 실패를 모으면서 계속하려면
    /// [`Converter::convert_each`]를 사용합니다.
    pub fn convert_files(
        &self,
        inputs: &[PathBuf],
        output: Option<&Path>,
        options: &ConvertOptions,
        combine: bool,
    ) -> Result<Vec<ConvertReport>> {
        if combine {
            return Ok(vec![self.combine_files(inputs, output, options)?]);
        }

        match (inputs, output) {
            ([input], output) => Ok(vec![self.convert_file(input, output, options)?]),
            (_, Some(_)) => Err(JcsvError::AmbiguousOutput {
                inputs: inputs.len(),
            }),
            (_, None) => inputs
                .iter()
                .zip(self.batch_outputs(inputs))
                .map(|(input, output)| self.convert_file(input, Some(&output), options))
                .collect(),
        }
    }

    /// 파일마다 CSV로 변환하며 결과를 하나씩 `on_file`에 전달
    ///
    /// 한 파일이 실패해도 나머지 파일은 계속 변환합니다.
    pub fn convert_each<F>(&self, inputs: &[PathBuf], options: &ConvertOptions, mut on_file: F)
    where
        F: FnMut(&Path, Result<ConvertReport>),
    {
        for (input, output) in inputs.iter().zip(self.batch_outputs(inputs)) {
            on_file(input, self.convert_file(input, Some(&output), options));
        }
    }

    /// 입력 파일 이름 기반 기본 출력 경로
    pub fn default_output(&self, input: &Path, suffix: Option<&str>) -> PathBuf {
        let stem = file_stem(input);
        let name = match suffix {
            Some(suffix) => format!("{}_{}_{}.csv", stem, suffix, timestamp()),
            None => format!("{}_{}.csv", stem, timestamp()),
        };
        self.output_dir.join(name)
    }

    /// 여러 입력의 기본 출력 경로
    ///
    /// 타임스탬프는 한 번만 찍고, 이름이 겹치면 `_2`, `_3`... 을 붙입니다.
    fn batch_outputs(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let ts = timestamp();
        let mut used = HashSet::new();

        inputs
            .iter()
            .map(|input| {
                let base = format!("{}_{}", file_stem(input), ts);
                let mut name = format!("{}.csv", base);
                let mut n = 1;
                while !used.insert(name.clone()) {
                    n += 1;
                    name = format!("{}_{}.csv", base, n);
                }
                self.output_dir.join(name)
            })
            .collect()
    }

    /// 평탄화 후 열 변환 적용
    fn finish(&self, records: Vec<Map<String, Value>>, flatten: Option<&Flattener>) -> Vec<FlatRecord> {
        records
            .into_iter()
            .map(|record| {
                let mut row = match flatten {
                    Some(flattener) => flattener.flatten_record(&record),
                    None => record,
                };
                self.transforms.apply(&mut row);
                row
            })
            .collect()
    }
}

/// 변환 대상 데이터 추출 (JSONPath 우선, 다음 중첩 키 경로)
fn extract(value: Value, options: &ConvertOptions) -> Result<Value> {
    if let Some(ref expr) = options.query {
        return Ok(Value::Array(query(&value, expr)?));
    }

    match options.nested_key_path {
        Some(ref path) => {
            let path = KeyPath::parse(path);
            Ok(resolve(&value, &path)?.clone())
        }
        None => Ok(value),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 출력 파일 이름용 타임스탬프 (YYYYMMDD_HHMMSS)
fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::ArrayStrategy;
    use crate::project::parse_field_specs;
    use serde_json::json;

    fn rows(records: Vec<FlatRecord>) -> Value {
        Value::Array(records.into_iter().map(Value::Object).collect())
    }

    #[test]
    fn test_build_records_flattens() {
        let converter = Converter::new("unused");
        let records = converter
            .build_records(
                json!([{"id": 1, "user": {"name": "A", "tags": ["x", "y"]}}]),
                &ConvertOptions::new(),
            )
            .unwrap();

        assert_eq!(
            rows(records),
            json!([{"id": 1, "user.name": "A", "user.tags": "x,y"}])
        );
    }

    #[test]
    fn test_build_records_nested_key_path() {
        let converter = Converter::new("unused");
        let options =
            ConvertOptions::new().with_nested_key_path(Some("data.items".to_string()));
        let records = converter
            .build_records(json!({"data": {"items": [{"id": 1}, {"id": 2}]}}), &options)
            .unwrap();

        assert_eq!(rows(records), json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_build_records_missing_nested_key_is_fatal() {
        let converter = Converter::new("unused");
        let options =
            ConvertOptions::new().with_nested_key_path(Some("data.missing".to_string()));
        let error = converter
            .build_records(json!({"data": {}}), &options)
            .unwrap_err();

        match error {
            JcsvError::PathNotFound { path, segment } => {
                assert_eq!(path, "data.missing");
                assert_eq!(segment, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_records_fields_then_flatten() {
        let converter = Converter::new("unused");
        let options = ConvertOptions::new()
            .with_fields(Some(parse_field_specs("id,network.connection,device.registered").unwrap()));
        let records = converter
            .build_records(
                json!({"id": "p1", "network": {"connection": {"type": "wifi", "secure": true}}}),
                &options,
            )
            .unwrap();

        assert_eq!(
            rows(records),
            json!([{
                "id": "p1",
                "network.connection.type": "wifi",
                "network.connection.secure": true,
                "device.registered": null
            }])
        );
    }

    #[test]
    fn test_build_records_without_flatten() {
        let converter = Converter::new("unused");
        let options = ConvertOptions::new().with_flatten(None);
        let records = converter
            .build_records(json!({"a": {"b": 1}}), &options)
            .unwrap();

        assert_eq!(rows(records), json!([{"a": {"b": 1}}]));
    }

    #[test]
    fn test_build_records_index_strategy() {
        let converter = Converter::new("unused");
        let options = ConvertOptions::new().with_flatten(Some(
            Flattener::new()
                .with_separator("_")
                .with_arrays(ArrayStrategy::Index),
        ));
        let records = converter
            .build_records(json!({"tags": ["x", "y"]}), &options)
            .unwrap();

        assert_eq!(rows(records), json!([{"tags_0": "x", "tags_1": "y"}]));
    }

    #[test]
    fn test_build_records_query() {
        let converter = Converter::new("unused");
        let options = ConvertOptions::new().with_query(Some("$.users[*].name".to_string()));
        let records = converter
            .build_records(json!({"users": [{"name": "A"}, {"name": "B"}]}), &options)
            .unwrap();

        assert_eq!(rows(records), json!([{"value": "A"}, {"value": "B"}]));
    }

    #[test]
    fn test_build_records_applies_transforms_after_flatten() {
        let converter = Converter::new("unused")
            .with_transforms(Transforms::new().register_builtin("user.name", "upper").unwrap());
        let records = converter
            .build_records(json!({"user": {"name": "ann"}}), &ConvertOptions::new())
            .unwrap();

        assert_eq!(rows(records), json!([{"user.name": "ANN"}]));
    }

    #[test]
    fn test_batch_outputs_deduplicate_same_stem() {
        let converter = Converter::new("csv_output");
        let outputs = converter.batch_outputs(&[
            PathBuf::from("a/data.json"),
            PathBuf::from("b/data.json"),
            PathBuf::from("c/other.json"),
        ]);

        let names: Vec<&str> = outputs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert!(names[0].starts_with("data_") && !names[0].ends_with("_2.csv"));
        assert!(names[1].starts_with("data_") && names[1].ends_with("_2.csv"));
        assert!(names[2].starts_with("other_"));
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_convert_files_rejects_shared_output() {
        let converter = Converter::new("unused");
        let inputs = [PathBuf::from("a.json"), PathBuf::from("b.json")];
        let result = converter.convert_files(
            &inputs,
            Some(Path::new("out.csv")),
            &ConvertOptions::new(),
            false,
        );

        assert!(matches!(result, Err(JcsvError::AmbiguousOutput { inputs: 2 })));
    }

    #[test]
    fn test_default_output_name() {
        let converter = Converter::new("csv_output");
        let path = converter.default_output(Path::new("data/users.json"), Some("mapped"));

        assert_eq!(path.parent(), Some(Path::new("csv_output")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("users_mapped_"));
        assert!(name.ends_with(".csv"));
        // users_mapped_YYYYMMDD_HHMMSS.csv
        assert_eq!(name.len(), "users_mapped_".len() + 15 + ".csv".len());
    }
}
