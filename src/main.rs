//! codetextify - CODE TEXTIFY
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codetextify::{
    cli::Args,
    config::Config,
    hook::{NoopHook, OpenFolderHook, PostProcessHook},
    merger::{merge_staged, OutputKind},
    staging::{relative_path, stage_files, KeyAllocator},
    stats::{format_count, Statistics},
    walker::{MatchedFile, Traversal},
    workspace::{clear_dir, create_dir, Cleared},
};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::from_args(&args).map_err(|e| anyhow::anyhow!("{}", e))?;

    print_header(&config);

    // 파일 시스템을 건드리기 전에 설정 검증
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    // 탐색 (작업 폴더는 항상 제외)
    let traversal = Traversal::from_config(&config);
    let files: Vec<MatchedFile> = traversal.files().collect();

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        files.len().to_string().bright_green()
    );

    if files.is_empty() {
        println!(
            "{}",
            "⚠️ 지정한 확장자의 파일이 없습니다. 폴더와 확장자를 확인하세요.".yellow()
        );
        anyhow::bail!("처리할 파일이 없습니다");
    }

    if args.dry_run {
        print_dry_run(traversal.root(), &files);
        return Ok(());
    }

    let mut stats = Statistics::new(files.len());

    print_step(1, "기존 작업 폴더 정리");
    for dir in [&config.staging_dir, &config.output_dir] {
        let cleared = clear_dir(dir).context("작업 폴더를 정리하지 못했습니다")?;
        match cleared {
            Cleared::Removed => println!("  {} 정리됨: {}", "✓".green(), dir.display()),
            Cleared::Absent => println!("  {} 정리할 필요 없음: {}", "✓".green(), dir.display()),
        }
    }

    print_step(2, "작업 폴더 생성");
    for dir in [&config.staging_dir, &config.output_dir] {
        create_dir(dir).context("작업 폴더를 만들지 못했습니다")?;
        println!("  {} 생성됨: {}", "✓".green(), dir.display());
    }

    print_step(3, "파일 복사");
    let pb = create_progress_bar(files.len());
    let staging = stage_files(traversal.root(), files, &config.staging_dir, &pb)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    pb.finish_with_message("완료!");
    stats.record_staging(&staging);

    println!(
        "  {} {}개 파일 복사 완료",
        "✓".green(),
        staging.copied().to_string().bright_green()
    );
    print_errors("복사 실패 파일", &staging.failures, args.verbose);

    print_step(4, "병합 파일 생성");
    let merge = merge_staged(&config).map_err(|e| anyhow::anyhow!("{}", e))?;
    stats.record_merge(&merge);

    for output in &merge.outputs {
        let detail = match output.kind {
            OutputKind::Merge => format!("{}개 파일", output.entries.len()),
            OutputKind::SplitPart(part) => format!("조각 {}/{}", part.part, part.total),
        };
        println!(
            "  {} {} 생성 ({}, {}자)",
            "✓".green(),
            output.file_name.bright_white(),
            detail,
            format_count(output.chars)
        );
    }
    let skipped: Vec<(PathBuf, String)> = merge
        .binary_skipped
        .iter()
        .map(|p| (p.clone(), "바이너리 파일".to_string()))
        .chain(merge.read_failures.iter().cloned())
        .collect();
    print_errors("건너뛴 파일", &skipped, args.verbose);

    print_step(5, "출력 폴더 열기");
    let hook: Box<dyn PostProcessHook> = if args.open {
        Box::new(OpenFolderHook)
    } else {
        Box::new(NoopHook)
    };
    run_hook(hook.as_ref(), &config.output_dir);

    stats.print_summary();

    println!(
        "\n{} 병합 결과 위치: {}\n",
        "✅".bright_green(),
        config.output_dir.display()
    );

    Ok(())
}

/// 로그 초기화 (RUST_LOG가 우선, --verbose면 DEBUG)
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// 헤더 출력
fn print_header(config: &Config) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 CODE TEXTIFY".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!(
        "  {} 소스 폴더:    {}",
        "📂".bright_cyan(),
        config.source_dir.display()
    );
    println!(
        "  {} 스테이징:     {}",
        "🗂️".bright_cyan(),
        config.staging_dir.display()
    );
    println!(
        "  {} 출력 폴더:    {}",
        "📄".bright_green(),
        config.output_dir.display()
    );
    println!(
        "  {} 확장자:       {}",
        "🔍".bright_magenta(),
        config.extensions.extensions().join(", ")
    );
    println!(
        "  {} 최대 문자 수: {}",
        "📏".bright_white(),
        format_count(config.max_chars)
    );
    println!(
        "  {} 출력 접두사:  {}",
        "⚙️".bright_yellow(),
        config.output_prefix
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 단계 제목 출력
fn print_step(step: usize, description: &str) {
    println!(
        "\n{} {}",
        format!("[STEP {}]", step).bright_cyan().bold(),
        description.bright_white()
    );
}

/// 드라이런 출력
fn print_dry_run(root: &Path, files: &[MatchedFile]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    let mut allocator = KeyAllocator::new();
    for (i, file) in files.iter().enumerate() {
        let rel = relative_path(root, &file.path());
        let key = allocator.allocate(&rel);
        println!("  {}. {} {}", i + 1, rel, format!("→ {}", key).dimmed());
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|s| s.progress_chars("█▓▒░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// 에러 목록 출력
fn print_errors(title: &str, errors: &[(PathBuf, String)], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", format!("❌ {}:", title).bright_red());
    for (path, error) in errors {
        println!("  {} {:?}", "•".red(), path.file_name().unwrap_or_default());
        if verbose {
            println!("    {}", error.dimmed());
        }
    }
}

/// 후처리 훅 실행 (실패해도 경고만)
fn run_hook(hook: &dyn PostProcessHook, output_dir: &Path) {
    match hook.after_merge(output_dir) {
        Ok(()) => println!("  {} {} 완료", "✓".green(), hook.name()),
        Err(e) => {
            warn!("후처리 훅 {} 실패: {}", hook.name(), e);
            println!("  {} 출력 폴더를 열 수 없습니다: {}", "⚠".yellow(), e);
        }
    }
}
