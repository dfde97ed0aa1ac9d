//! 통계 및 유틸리티 모듈
//!
//! 실행 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::time::{Duration, Instant};

use crate::merger::MergeReport;
use crate::staging::StagingReport;

/// 실행 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 탐색으로 찾은 파일 수
    pub matched_files: usize,
    /// 스테이징된 파일 수
    pub staged_files: usize,
    /// 복사 실패 수
    pub copy_errors: usize,
    /// 키 충돌 해소 횟수
    pub key_collisions: usize,
    /// 복사한 총 바이트
    pub bytes_copied: u64,
    /// 출력에 포함된 파일 수
    pub merged_files: usize,
    /// 분할된 파일 수
    pub split_files: usize,
    /// 바이너리로 건너뛴 파일 수
    pub binary_skipped: usize,
    /// 읽기 실패 수
    pub read_errors: usize,
    /// 대체 모드로 표시된 항목 수
    pub fallback_entries: usize,
    /// 손실 디코딩된 파일 수
    pub lossy_files: usize,
    /// 기록된 출력 파일 수
    pub outputs_written: usize,
    /// 기록된 총 문자 수
    pub chars_written: usize,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(matched_files: usize) -> Self {
        Self {
            matched_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 스테이징 결과 반영
    pub fn record_staging(&mut self, report: &StagingReport) {
        self.staged_files = report.copied();
        self.copy_errors = report.failures.len();
        self.key_collisions = report.collisions;
        self.bytes_copied = report.bytes_copied;
    }

    /// 병합 결과 반영
    pub fn record_merge(&mut self, report: &MergeReport) {
        self.merged_files = report.merged_files;
        self.split_files = report.split_files;
        self.binary_skipped = report.binary_skipped.len();
        self.read_errors = report.read_failures.len();
        self.fallback_entries = report.fallback_entries;
        self.lossy_files = report.lossy_files;
        self.outputs_written = report.outputs.len();
        self.chars_written = report.outputs.iter().map(|o| o.chars).sum();
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 찾은 파일 대비 병합된 파일 비율 (%)
    pub fn success_rate(&self) -> f64 {
        if self.matched_files == 0 {
            return 0.0;
        }
        (self.merged_files as f64 / self.matched_files as f64) * 100.0
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 찾은 파일:    {}",
            "📁".bright_cyan(),
            self.matched_files
        );
        println!(
            "  {} 복사:         {} ({})",
            "📋".bright_cyan(),
            self.staged_files.to_string().green(),
            format_bytes(self.bytes_copied)
        );

        if self.copy_errors > 0 {
            println!(
                "  {} 복사 실패:    {}",
                "❌".bright_red(),
                self.copy_errors.to_string().red()
            );
        }
        if self.key_collisions > 0 {
            println!(
                "  {} 키 충돌 해소: {}",
                "🔀".bright_yellow(),
                self.key_collisions.to_string().yellow()
            );
        }

        println!(
            "  {} 병합:         {}",
            "✅".bright_green(),
            self.merged_files.to_string().green()
        );

        if self.split_files > 0 {
            println!(
                "  {} 분할 파일:    {}",
                "✂️".bright_magenta(),
                self.split_files
            );
        }
        if self.binary_skipped > 0 {
            println!(
                "  {} 바이너리:     {}",
                "⚠️".bright_yellow(),
                self.binary_skipped.to_string().yellow()
            );
        }
        if self.read_errors > 0 {
            println!(
                "  {} 읽기 실패:    {}",
                "❌".bright_red(),
                self.read_errors.to_string().red()
            );
        }
        if self.lossy_files > 0 {
            println!(
                "  {} 문자 치환:    {}",
                "⚠️".bright_yellow(),
                self.lossy_files.to_string().yellow()
            );
        }
        if self.fallback_entries > 0 {
            println!(
                "  {} 대체 표시:    {}",
                "⚠️".bright_yellow(),
                self.fallback_entries.to_string().yellow()
            );
        }

        println!(
            "  {} 출력 파일:    {} ({}자)",
            "📤".bright_magenta(),
            self.outputs_written,
            format_count(self.chars_written)
        );

        if self.matched_files > 0 {
            println!(
                "  {} 성공률:       {:.1}%",
                "📈".bright_white(),
                self.success_rate()
            );
        }

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
/// use codetextify::stats::format_bytes;
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

/// 천 단위 구분 기호를 넣은 숫자 (예: 75000 → "75,000")
pub fn format_count(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
