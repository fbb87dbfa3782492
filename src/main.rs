//! jcsv - JSON TO CSV CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jcsv::{
    cli::{Cli, Command, ConvertArgs, MergeArgs, QueryArgs},
    converter::{ConvertOptions, ConvertReport, Converter},
    loader::load_json,
    merge::merge_directory,
    pattern::PatternMatcher,
    query::query,
    stats::{format_bytes, Statistics},
    table::WriteOutcome,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::Merge(args) => run_merge(&args),
        Command::Query(args) => run_query(&args),
    }
}

/// 로그 설정 (stderr, RUST_LOG 우선)
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// 변환 명령 실행
fn run_convert(args: &ConvertArgs) -> Result<()> {
    let options = ConvertOptions::new()
        .with_fields(args.get_fields()?)
        .with_nested_key_path(args.nested_key.clone())
        .with_query(args.query.clone())
        .with_flatten(args.get_flattener())
        .with_mode(args.mode);
    let converter = Converter::new(&args.output_dir).with_transforms(args.get_transforms()?);

    if !args.json {
        print_header(args);
    }

    let mut stats = Statistics::new(args.inputs.len());
    let mut reports = Vec::new();

    if args.combine || args.output.is_some() || args.inputs.len() == 1 {
        let converted = converter
            .convert_files(&args.inputs, args.output.as_deref(), &options, args.combine)
            .context("변환 실패")?;
        for report in converted {
            stats.record(&report);
            reports.push(report);
        }
    } else {
        let pb = create_progress_bar(args.inputs.len(), args.json);
        let mut errors: Vec<(PathBuf, String)> = Vec::new();

        converter.convert_each(&args.inputs, &options, |input, result| {
            match result {
                Ok(report) => {
                    stats.record(&report);
                    reports.push(report);
                }
                Err(e) => {
                    stats.record_failure();
                    errors.push((input.to_path_buf(), e.to_string()));
                }
            }
            pb.inc(1);
        });
        pb.finish_and_clear();

        print_errors(&errors);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    print_outputs(&reports);
    stats.print_summary();

    if stats.failed > 0 {
        anyhow::bail!("{} 개의 파일 변환에 실패했습니다", stats.failed);
    }

    Ok(())
}

/// 병합 명령 실행
fn run_merge(args: &MergeArgs) -> Result<()> {
    let matcher = PatternMatcher::new(args.pattern.clone())?;
    let report = merge_directory(&args.input, &args.output, args.max_depth, &matcher, args.mode)
        .with_context(|| format!("JSON 병합 실패: {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "\n{} {} 개의 파일을 병합했습니다: {} ({} → {})\n",
            "✅".bright_green(),
            report.files.to_string().bright_green(),
            report.output.display(),
            format_bytes(report.bytes_read),
            format_bytes(report.bytes_written)
        );
    }

    Ok(())
}

/// 쿼리 명령 실행 (일치하는 값을 한 줄에 하나씩 출력)
fn run_query(args: &QueryArgs) -> Result<()> {
    let doc = load_json(&args.input)?;
    let matches = query(&doc.value, &args.expr)?;

    for value in &matches {
        println!("{}", serde_json::to_string(value)?);
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &ConvertArgs) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 JSON TO CSV CONVERTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!(
        "  {} 입력 파일:    {}",
        "📂".bright_cyan(),
        args.inputs.len()
    );

    match args.output {
        Some(ref output) => println!("  {} 출력 파일:    {:?}", "📄".bright_green(), output),
        None => println!(
            "  {} 출력 폴더:    {:?}",
            "📄".bright_green(),
            args.output_dir
        ),
    }

    if let Some(ref path) = args.nested_key {
        println!("  {} 중첩 경로:    {}", "🧭".bright_magenta(), path);
    }

    if let Some(ref expr) = args.query {
        println!("  {} JSONPath:     {}", "🔍".bright_magenta(), expr);
    }

    if let Some(ref fields) = args.fields {
        println!("  {} 필드 선택:    {}", "🎯".bright_cyan(), fields);
    }

    if args.no_flatten {
        println!("  {} {}", "⚠️".bright_yellow(), "평탄화 안 함".yellow());
    } else {
        println!(
            "  {} 평탄화:       구분자 {:?}, 배열 {}",
            "🪜".bright_white(),
            args.separator,
            args.arrays
        );
    }

    if args.combine {
        println!("  {} {}", "🗂️".bright_cyan(), "하나의 CSV로 합치기".cyan());
    }

    println!("  {} 모드:         {}", "⚙️".bright_yellow(), args.mode);
    println!("{}", "═".repeat(50).bright_blue());
}

/// 진행률 바 생성 (JSON 출력 모드나 단일 파일이면 숨김)
fn create_progress_bar(total: usize, hidden: bool) -> ProgressBar {
    if hidden || total < 2 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|s| s.progress_chars("█▓▒░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// 생성된 파일 목록 출력
fn print_outputs(reports: &[ConvertReport]) {
    for report in reports {
        match report.outcome {
            WriteOutcome::Written {
                ref path,
                rows,
                columns,
                ..
            } => println!(
                "  {} {} ({} 행 × {} 열)",
                "✓".green(),
                path.display(),
                rows,
                columns
            ),
            WriteOutcome::Empty => println!(
                "  {} {:?}: 쓸 레코드가 없습니다",
                "⚠️".bright_yellow(),
                report.inputs
            ),
        }
    }
}

/// 에러 목록 출력
fn print_errors(errors: &[(PathBuf, String)]) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for (path, error) in errors {
        println!("  {} {:?}", "•".red(), path.file_name().unwrap_or_default());
        println!("    {}", error.dimmed());
    }
}
