//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::{JcsvError, Result};
use crate::flatten::{ArrayStrategy, Flattener, DEFAULT_SEPARATOR};
use crate::project::{parse_field_specs, FieldSpec};
use crate::transform::Transforms;

/// 출력 파일 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 파일이 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// jcsv CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "jcsv",
    author = "YourName <your@email.com>",
    version,
    about = "JSON TO CSV CONVERTER - 중첩된 JSON을 평탄화하여 CSV로 변환하는 CLI 도구",
    long_about = r#"
JSON TO CSV CONVERTER
=====================

중첩된 JSON 문서(객체, 배열, 스칼라 혼합)를 평탄화하여
CSV 표로 변환합니다.

특징:
  • 중첩 키를 점 경로로 펼치기 (a.b.c, items.0.name)
  • 필드 선택 및 이름 변경 (id,user.email=email)
  • 여러 파일을 하나의 CSV로 합치기
  • 폴더 내 JSON 파일 병합
  • JSONPath 쿼리

예제:
  jcsv convert data.json -o result.csv
  jcsv convert data.json --nested-key data.items --fields "id,name"
  jcsv convert a.json b.json --combine -d ./csv_output
  jcsv merge -i ./json_folder -o merged.json
  jcsv query data.json '$.store.book[*].author'
"#
)]
pub struct Cli {
    /// 상세 로그 출력 (RUST_LOG가 설정되어 있으면 그 값을 우선)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// 하위 명령
#[derive(Subcommand, Debug)]
pub enum Command {
    /// JSON 파일을 CSV로 변환
    Convert(ConvertArgs),
    /// 폴더 내 JSON 파일들을 하나의 JSON으로 병합
    Merge(MergeArgs),
    /// JSONPath 표현식과 일치하는 값 출력
    Query(QueryArgs),
}

/// `convert` 인자
#[derive(ClapArgs, Debug, Clone)]
pub struct ConvertArgs {
    /// 변환할 JSON 파일 경로 (여러 개 가능)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// 생성될 CSV 파일 경로 (입력이 하나이거나 --combine일 때만 사용)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 출력 경로를 지정하지 않았을 때 CSV를 저장할 폴더
    #[arg(short = 'd', long, default_value = "csv_output")]
    pub output_dir: PathBuf,

    /// 추출할 필드 (쉼표로 구분, "원본=새이름"으로 이름 변경, 예: "id,user.email=email")
    #[arg(long)]
    pub fields: Option<String>,

    /// 변환할 데이터의 위치 (점 경로, 예: "data.items")
    #[arg(long)]
    pub nested_key: Option<String>,

    /// 변환할 데이터를 고르는 JSONPath 표현식 (--nested-key 대신 사용)
    #[arg(long, conflicts_with = "nested_key")]
    pub query: Option<String>,

    /// 중첩 객체를 평탄화하지 않음
    #[arg(long)]
    pub no_flatten: bool,

    /// 평탄화 키 구분자
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    /// 배열 평탄화 방식
    #[arg(long, value_enum, default_value_t = ArrayStrategy::Join)]
    pub arrays: ArrayStrategy,

    /// 열 변환 (필드=변환이름, 변환: upper, lower, trim, length)
    #[arg(short, long = "transform")]
    pub transforms: Vec<String>,

    /// 모든 입력을 하나의 CSV로 합치기 (각 행에 _source_file 추가)
    #[arg(long)]
    pub combine: bool,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 결과 요약을 JSON으로 출력
    #[arg(long)]
    pub json: bool,
}

impl ConvertArgs {
    /// 필드 지정 목록 파싱
    pub fn get_fields(&self) -> Result<Option<Vec<FieldSpec>>> {
        self.fields.as_deref().map(parse_field_specs).transpose()
    }

    /// 평탄화 설정 (--no-flatten이면 None)
    pub fn get_flattener(&self) -> Option<Flattener> {
        if self.no_flatten {
            return None;
        }
        Some(
            Flattener::new()
                .with_separator(self.separator.clone())
                .with_arrays(self.arrays),
        )
    }

    /// 열 변환 레지스트리 생성
    pub fn get_transforms(&self) -> Result<Transforms> {
        self.transforms
            .iter()
            .try_fold(Transforms::new(), |transforms, entry| -> Result<Transforms> {
                let (field, name) =
                    entry
                        .split_once('=')
                        .ok_or_else(|| JcsvError::InvalidFieldSpec {
                            spec: entry.clone(),
                        })?;
                transforms.register_builtin(field.trim(), name.trim())
            })
    }
}

/// `merge` 인자
#[derive(ClapArgs, Debug, Clone)]
pub struct MergeArgs {
    /// JSON 파일들이 있는 입력 폴더 경로
    #[arg(short, long)]
    pub input: PathBuf,

    /// 병합 결과 JSON 파일 경로
    #[arg(short, long, default_value = "merged.json")]
    pub output: PathBuf,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "users_*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 최대 폴더 탐색 깊이 (1이면 하위 폴더를 보지 않음)
    #[arg(long, default_value_t = 1)]
    pub max_depth: usize,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 결과 요약을 JSON으로 출력
    #[arg(long)]
    pub json: bool,
}

/// `query` 인자
#[derive(ClapArgs, Debug, Clone)]
pub struct QueryArgs {
    /// JSON 파일 경로
    pub input: PathBuf,

    /// JSONPath 표현식 (예: "$.store.book[*].author")
    pub expr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn convert_args(args: &[&str]) -> ConvertArgs {
        match parse(args).command {
            Command::Convert(convert) => convert,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_convert_defaults() {
        let args = convert_args(&["jcsv", "convert", "data.json"]);

        assert_eq!(args.inputs, vec![PathBuf::from("data.json")]);
        assert_eq!(args.output_dir, PathBuf::from("csv_output"));
        assert_eq!(args.separator, ".");
        assert_eq!(args.arrays, ArrayStrategy::Join);
        assert_eq!(args.mode, WriteMode::Overwrite);
        assert!(args.get_fields().unwrap().is_none());
        assert_eq!(args.get_flattener(), Some(Flattener::new()));
    }

    #[test]
    fn test_convert_fields_parsing() {
        let args = convert_args(&[
            "jcsv",
            "convert",
            "data.json",
            "--fields",
            "id, name, user.email=email",
        ]);

        let fields = args.get_fields().unwrap().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], FieldSpec::Key("id".to_string()));
        assert_eq!(
            fields[2],
            FieldSpec::Rename {
                from: "user.email".to_string(),
                to: "email".to_string()
            }
        );
    }

    #[test]
    fn test_convert_flatten_options() {
        let args = convert_args(&[
            "jcsv",
            "convert",
            "data.json",
            "--separator",
            "_",
            "--arrays",
            "index",
        ]);
        let flattener = args.get_flattener().unwrap();
        assert_eq!(flattener.separator(), "_");
        assert_eq!(flattener.arrays(), ArrayStrategy::Index);

        let args = convert_args(&["jcsv", "convert", "data.json", "--no-flatten"]);
        assert!(args.get_flattener().is_none());
    }

    #[test]
    fn test_convert_transforms() {
        let args = convert_args(&[
            "jcsv", "convert", "data.json", "-t", "name=upper", "-t", "city = trim",
        ]);
        assert!(!args.get_transforms().unwrap().is_empty());

        let args = convert_args(&["jcsv", "convert", "data.json", "-t", "name"]);
        assert!(args.get_transforms().is_err());

        let args = convert_args(&["jcsv", "convert", "data.json", "-t", "name=reverse"]);
        assert!(args.get_transforms().is_err());
    }

    #[test]
    fn test_nested_key_conflicts_with_query() {
        let result = Cli::try_parse_from([
            "jcsv",
            "convert",
            "data.json",
            "--nested-key",
            "a",
            "--query",
            "$.a",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_defaults() {
        match parse(&["jcsv", "merge", "-i", "./data"]).command {
            Command::Merge(args) => {
                assert_eq!(args.output, PathBuf::from("merged.json"));
                assert_eq!(args.max_depth, 1);
                assert!(args.pattern.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_write_mode_display() {
        assert_eq!(WriteMode::Overwrite.to_string(), "Overwrite");
        assert_eq!(WriteMode::Error.to_string(), "Error");
    }
}
