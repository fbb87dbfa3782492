//! 통계 및 유틸리티 모듈
//!
//! 변환 결과 집계 및 요약 출력을 담당합니다.

use colored::Colorize;
use std::time::{Duration, Instant};

use crate::converter::ConvertReport;
use crate::table::WriteOutcome;

/// 변환 통계 구조체
#[derive(Debug)]
pub struct Statistics {
    /// 총 입력 파일 수
    pub total_files: usize,
    /// CSV로 변환된 파일 수 (합치기 모드에서는 합쳐진 입력 수)
    pub converted: usize,
    /// 레코드가 없어 건너뛴 파일 수
    pub skipped: usize,
    /// 실패한 파일 수
    pub failed: usize,
    /// 생성된 CSV 파일 수
    pub outputs: usize,
    /// 쓴 행 수
    pub rows_written: usize,
    /// 가장 넓은 표의 열 수
    pub max_columns: usize,
    /// 읽은 총 바이트
    pub bytes_read: u64,
    /// 쓴 총 바이트
    pub bytes_written: u64,
    start_time: Instant,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            converted: 0,
            skipped: 0,
            failed: 0,
            outputs: 0,
            rows_written: 0,
            max_columns: 0,
            bytes_read: 0,
            bytes_written: 0,
            start_time: Instant::now(),
        }
    }

    /// 변환 결과 반영
    pub fn record(&mut self, report: &ConvertReport) {
        self.bytes_read += report.bytes_read;

        match report.outcome {
            WriteOutcome::Written {
                rows,
                columns,
                bytes,
                ..
            } => {
                self.converted += report.inputs.len();
                self.outputs += 1;
                self.rows_written += rows;
                self.max_columns = self.max_columns.max(columns);
                self.bytes_written += bytes;
            }
            WriteOutcome::Empty => self.skipped += report.inputs.len(),
        }
    }

    /// 실패 카운트 증가
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 변환 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        println!(
            "  {} 변환:         {}",
            "✅".bright_green(),
            self.converted.to_string().green()
        );

        if self.skipped > 0 {
            println!(
                "  {} 빈 결과:      {}",
                "⚠️".bright_yellow(),
                self.skipped.to_string().yellow()
            );
        }

        if self.failed > 0 {
            println!(
                "  {} 실패:         {}",
                "❌".bright_red(),
                self.failed.to_string().red()
            );
        } else {
            println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} CSV 파일:     {} (행 {}, 최대 열 {})",
            "📄".bright_white(),
            self.outputs,
            self.rows_written,
            self.max_columns
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.bytes_written)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use jcsv::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
