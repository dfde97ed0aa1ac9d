//! 병합 모듈
//!
//! 스테이징된 파일을 이름순으로 읽어 크기 제한(`max_chars`)이 있는 출력 파일로 묶습니다.
//! 각 출력 파일은 포함된 파일 목록(인덱스)으로 시작합니다.
//! 혼자서도 제한을 넘는 파일은 여러 조각으로 나뉘어 `prefix-N-P.txt`로 따로 기록됩니다.
//!
//! 모든 크기는 문자(유니코드 스칼라 값) 단위입니다.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CodeTextifyError, Result};
use crate::reader::{read_text, Decoded};
use crate::splitter::split_content;
use crate::staging::{FileMap, STAGED_EXTENSION};

/// 파일 헤더 배너 폭
pub const BANNER_WIDTH: usize = 100;

/// 인덱스 블록 첫 줄
pub const INDEX_TITLE: &str = "--- INDEX OF FILES IN THIS MERGE ---";

/// 인덱스 블록 구분선 폭
pub const INDEX_SEPARATOR_WIDTH: usize = 35;

/// 분할 판정에 쓰는 인덱스 크기 추정치
pub const INDEX_ESTIMATE: usize = 150;

/// 일반 버퍼링 시 여유분
pub const BUFFER_SAFETY_MARGIN: usize = 100;

/// 분할 조각 번호
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    /// 1부터 시작하는 조각 번호
    pub part: usize,
    /// 전체 조각 수
    pub total: usize,
}

/// 출력 파일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// 일반 병합 파일 (`prefix-N.txt`)
    Merge,
    /// 대용량 파일의 조각 (`prefix-N-P.txt`)
    SplitPart(PartInfo),
}

/// 기록된 출력 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: OutputKind,
    /// 인덱스에 나열된 표시 경로
    pub entries: Vec<String>,
    /// 기록된 전체 문자 수
    pub chars: usize,
}

/// 파일 하나가 배치된 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 현재 버퍼에 추가됨
    Buffered,
    /// 현재 버퍼를 먼저 기록한 뒤 새 버퍼에 추가됨
    BufferedAfterFlush,
    /// 여러 조각으로 분할 기록됨
    Split { parts: usize },
}

/// 헤더 배너 생성
///
/// ```
/// use codetextify::merger::render_header;
///
/// let header = render_header("main.py", None);
/// assert!(header.starts_with(&"=".repeat(100)));
/// assert!(header.contains("\nFile: main.py\n"));
/// ```
pub fn render_header(name: &str, part: Option<PartInfo>) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    match part {
        Some(p) => format!(
            "{banner}\nFile: {name} (Part {} of {})\n{banner}\n\n",
            p.part, p.total
        ),
        None => format!("{banner}\nFile: {name}\n{banner}\n\n"),
    }
}

/// 헤더 + 내용 + 빈 줄
pub fn render_entry(name: &str, content: &str, part: Option<PartInfo>) -> String {
    let mut entry = render_header(name, part);
    entry.push_str(content);
    entry.push_str("\n\n");
    entry
}

/// 인덱스 블록 한 줄
fn render_index_line(position: usize, display_path: &str) -> String {
    format!("File #{}: {}\n", position, display_path)
}

/// 분할 판정용 헤더 크기 추정
fn header_estimate(name: &str) -> usize {
    let banner = "=".repeat(BANNER_WIDTH);
    format!("{banner}\nFile: {name} (Part X of Y)\n{banner}\n\n")
        .chars()
        .count()
}

/// 인덱스 제목 줄과 구분선의 고정 크기
fn index_frame_chars() -> usize {
    INDEX_TITLE.len() + 1 + INDEX_SEPARATOR_WIDTH + 2
}

#[derive(Debug)]
struct BufferedEntry {
    display_path: String,
    rendered: String,
}

/// 출력 버퍼와 번호를 소유하는 병합 계획기
///
/// 버퍼가 비어 있으면 대기 상태, 항목이 있으면 누적 상태입니다.
/// `flush`가 버퍼를 기록하고 대기 상태로 되돌립니다.
pub struct MergePlanner<'a> {
    config: &'a Config,
    buffer: Vec<BufferedEntry>,
    /// 버퍼에 쌓인 렌더링된 항목 문자 수
    buffer_chars: usize,
    /// 현재 버퍼 기준 인덱스 블록 문자 수
    index_chars: usize,
    /// 다음 출력 파일 번호 (1부터)
    output_index: usize,
    outputs: Vec<OutputFile>,
}

impl<'a> MergePlanner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            buffer_chars: 0,
            index_chars: 0,
            output_index: 1,
            outputs: Vec::new(),
        }
    }

    /// 파일 하나 배치
    ///
    /// # Arguments
    /// * `name` - 헤더에 표시할 원본 파일 이름
    /// * `display_path` - 인덱스에 표시할 경로
    /// * `content` - 디코딩된 내용
    pub fn add(&mut self, name: &str, display_path: &str, content: &str) -> Result<Placement> {
        let header_est = header_estimate(name);
        let content_chars = content.chars().count();

        if content_chars + header_est + INDEX_ESTIMATE > self.config.max_chars {
            let parts = self.write_split(name, display_path, content, header_est)?;
            return Ok(Placement::Split { parts });
        }

        let rendered = render_entry(name, content, None);
        let entry_chars = rendered.chars().count();
        let line_chars = render_index_line(self.buffer.len() + 1, display_path)
            .chars()
            .count();

        let mut placement = Placement::Buffered;
        if !self.buffer.is_empty()
            && self.buffer_chars + entry_chars + self.index_chars + line_chars + BUFFER_SAFETY_MARGIN
                > self.config.max_chars
        {
            self.flush()?;
            placement = Placement::BufferedAfterFlush;
        }

        self.push(display_path.to_string(), rendered);
        Ok(placement)
    }

    /// 현재 버퍼를 일반 병합 파일로 기록
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let file_name = format!("{}-{}.txt", self.config.output_prefix, self.output_index);
        self.write_buffer(file_name, OutputKind::Merge)?;
        self.output_index += 1;
        Ok(())
    }

    /// 남은 버퍼를 기록하고 출력 목록 반환
    pub fn finish(mut self) -> Result<Vec<OutputFile>> {
        self.flush()?;
        Ok(self.outputs)
    }

    fn push(&mut self, display_path: String, rendered: String) {
        if self.buffer.is_empty() {
            self.index_chars = index_frame_chars();
        }
        self.index_chars += render_index_line(self.buffer.len() + 1, &display_path)
            .chars()
            .count();
        self.buffer_chars += rendered.chars().count();
        self.buffer.push(BufferedEntry {
            display_path,
            rendered,
        });
    }

    fn write_split(
        &mut self,
        name: &str,
        display_path: &str,
        content: &str,
        header_est: usize,
    ) -> Result<usize> {
        // 분할 조각은 다른 파일과 섞이지 않음
        self.flush()?;

        let available = self
            .config
            .max_chars
            .saturating_sub(header_est + INDEX_ESTIMATE);
        let detector = self
            .config
            .boundary
            .applies_to(name)
            .then_some(&self.config.boundary);
        let chunks = split_content(content, available, detector);
        let total = chunks.len();

        if total == 0 {
            warn!("분할 결과 내용이 없어 건너뜁니다: {}", display_path);
            return Ok(0);
        }
        info!("대용량 파일 분할: {} → {}개 조각", display_path, total);

        for (i, chunk) in chunks.iter().enumerate() {
            let part = PartInfo {
                part: i + 1,
                total,
            };
            let part_path = format!("{} (Part {}/{})", display_path, part.part, part.total);
            self.push(part_path, render_entry(name, chunk, Some(part)));

            let file_name = format!(
                "{}-{}-{}.txt",
                self.config.output_prefix, self.output_index, part.part
            );
            self.write_buffer(file_name, OutputKind::SplitPart(part))?;
        }

        self.output_index += 1;
        Ok(total)
    }

    /// 버퍼를 인덱스 블록과 함께 기록하고 비움
    fn write_buffer(&mut self, file_name: String, kind: OutputKind) -> Result<()> {
        let mut text = String::with_capacity(self.index_chars + self.buffer_chars);
        text.push_str(INDEX_TITLE);
        text.push('\n');
        for (i, entry) in self.buffer.iter().enumerate() {
            text.push_str(&render_index_line(i + 1, &entry.display_path));
        }
        text.push_str(&"-".repeat(INDEX_SEPARATOR_WIDTH));
        text.push_str("\n\n");
        for entry in &self.buffer {
            text.push_str(&entry.rendered);
        }

        let path = self.config.output_dir.join(&file_name);
        fs::write(&path, &text).map_err(|e| CodeTextifyError::WriteError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let entries: Vec<String> = self
            .buffer
            .drain(..)
            .map(|entry| entry.display_path)
            .collect();
        debug!("출력 기록: {} ({}개 파일)", file_name, entries.len());

        self.outputs.push(OutputFile {
            path,
            file_name,
            kind,
            entries,
            chars: text.chars().count(),
        });
        self.buffer_chars = 0;
        self.index_chars = 0;
        Ok(())
    }
}

/// 병합 결과
#[derive(Debug, Default)]
pub struct MergeReport {
    /// 기록된 출력 파일
    pub outputs: Vec<OutputFile>,
    /// 출력에 포함된 파일 수
    pub merged_files: usize,
    /// 분할된 파일 수
    pub split_files: usize,
    /// 바이너리로 판정되어 건너뛴 파일
    pub binary_skipped: Vec<PathBuf>,
    /// 읽기 실패 (경로, 에러 메시지)
    pub read_failures: Vec<(PathBuf, String)>,
    /// 파일 맵 대신 스테이징 키로 표시된 항목 수
    pub fallback_entries: usize,
    /// 손실 디코딩된 파일 수
    pub lossy_files: usize,
}

/// 스테이징 폴더의 `*.txt` 파일을 이름순으로 나열
pub fn list_staged_files(staging_dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(staging_dir).map_err(|e| CodeTextifyError::ReadError {
        file: staging_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .map(|s| s == STAGED_EXTENSION)
                .unwrap_or(false)
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// 스테이징 폴더의 파일들을 병합
///
/// 파일 맵이 없거나 키가 없으면 스테이징 키를 이름과 경로로 사용합니다 (대체 모드).
/// 읽기 실패와 바이너리 파일은 경고 후 건너뜁니다.
pub fn merge_staged(config: &Config) -> Result<MergeReport> {
    let staged = list_staged_files(&config.staging_dir)?;
    if staged.is_empty() {
        return Err(CodeTextifyError::NoFilesToMerge);
    }

    let map = FileMap::load(&config.staging_dir);
    let mut planner = MergePlanner::new(config);
    let mut report = MergeReport::default();

    for path in staged {
        let staged_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = staged_name
            .strip_suffix(&format!(".{}", STAGED_EXTENSION))
            .unwrap_or(&staged_name)
            .to_string();

        let (name, display_path) = match map.as_ref().and_then(|m| m.get(&key)) {
            Some(entry) => (
                entry.original_filename.clone(),
                entry.relative_path.clone(),
            ),
            None => {
                if map.is_some() {
                    warn!("파일 맵에 없는 키, 스테이징 이름을 사용합니다: {}", key);
                }
                report.fallback_entries += 1;
                (key.clone(), key.clone())
            }
        };

        match read_text(&path, &config.encodings) {
            Ok(Decoded::Text {
                content,
                encoding,
                lossy,
            }) => {
                if lossy {
                    warn!("디코딩 실패 문자를 치환했습니다: {}", display_path);
                    report.lossy_files += 1;
                } else {
                    debug!("읽기: {} ({})", display_path, encoding);
                }
                match planner.add(&name, &display_path, &content)? {
                    // 공백만 있는 대용량 파일: 기록된 내용 없음
                    Placement::Split { parts: 0 } => {}
                    Placement::Split { .. } => {
                        report.split_files += 1;
                        report.merged_files += 1;
                    }
                    Placement::Buffered | Placement::BufferedAfterFlush => {
                        report.merged_files += 1;
                    }
                }
            }
            Ok(Decoded::Binary) => {
                let error = CodeTextifyError::BinaryFile { file: path.clone() };
                warn!("{}", error);
                report.binary_skipped.push(path);
            }
            Err(e) => {
                warn!("{}", e);
                report.read_failures.push((path, e.to_string()));
            }
        }
    }

    report.outputs = planner.finish()?;
    if report.outputs.is_empty() {
        return Err(CodeTextifyError::NoFilesToMerge);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionMatcher;
    use tempfile::TempDir;

    fn config(out: &Path, max_chars: usize) -> Config {
        Config::new(out, ExtensionMatcher::new([".py"]).unwrap())
            .with_output_dir(out)
            .with_max_chars(max_chars)
    }

    #[test]
    fn test_render_header_with_part() {
        let header = render_header(
            "big.py",
            Some(PartInfo {
                part: 2,
                total: 3,
            }),
        );
        let banner = "=".repeat(100);
        assert_eq!(
            header,
            format!("{banner}\nFile: big.py (Part 2 of 3)\n{banner}\n\n")
        );
    }

    #[test]
    fn test_header_estimate_matches_template() {
        // 배너 2줄(101자) + "File: a.py (Part X of Y)\n" + 빈 줄
        assert_eq!(header_estimate("a.py"), 101 + 25 + 101 + 1);
    }

    #[test]
    fn test_small_files_share_one_output() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), 10_000);
        let mut planner = MergePlanner::new(&config);

        assert_eq!(planner.add("a.py", "src/a.py", "A").unwrap(), Placement::Buffered);
        assert_eq!(planner.add("b.py", "src/b.py", "B").unwrap(), Placement::Buffered);
        let outputs = planner.finish().unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].file_name, "MergedFile-1.txt");
        assert_eq!(outputs[0].entries, vec!["src/a.py", "src/b.py"]);

        let text = fs::read_to_string(&outputs[0].path).unwrap();
        let banner = "=".repeat(100);
        let expected = format!(
            "--- INDEX OF FILES IN THIS MERGE ---\n\
             File #1: src/a.py\n\
             File #2: src/b.py\n\
             -----------------------------------\n\n\
             {banner}\nFile: a.py\n{banner}\n\nA\n\n\
             {banner}\nFile: b.py\n{banner}\n\nB\n\n"
        );
        assert_eq!(text, expected);
        assert_eq!(outputs[0].chars, expected.chars().count());
    }

    #[test]
    fn test_flush_when_next_entry_does_not_fit() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), 2_000);
        let mut planner = MergePlanner::new(&config);

        let body = "x".repeat(900);
        assert_eq!(planner.add("a.py", "a.py", &body).unwrap(), Placement::Buffered);
        assert_eq!(
            planner.add("b.py", "b.py", &body).unwrap(),
            Placement::BufferedAfterFlush
        );
        let outputs = planner.finish().unwrap();

        let names: Vec<_> = outputs.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(names, vec!["MergedFile-1.txt", "MergedFile-2.txt"]);
        assert!(outputs.iter().all(|o| o.chars <= 2_000));
    }

    #[test]
    fn test_oversize_file_split_and_numbering() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), 1_000);
        let mut planner = MergePlanner::new(&config);

        planner.add("small.py", "small.py", "s").unwrap();
        let content = "y".repeat(1_500);
        let placement = planner.add("notes.txt", "docs/notes.txt", &content).unwrap();
        planner.add("after.py", "after.py", "a").unwrap();
        let outputs = planner.finish().unwrap();

        // 1_000 - (233 + 150) = 617자씩 → 3조각
        assert_eq!(placement, Placement::Split { parts: 3 });
        let names: Vec<_> = outputs.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "MergedFile-1.txt",
                "MergedFile-2-1.txt",
                "MergedFile-2-2.txt",
                "MergedFile-2-3.txt",
                "MergedFile-3.txt",
            ]
        );
        assert_eq!(outputs[1].entries, vec!["docs/notes.txt (Part 1/3)"]);
        assert_eq!(
            outputs[3].kind,
            OutputKind::SplitPart(PartInfo { part: 3, total: 3 })
        );

        let part2 = fs::read_to_string(&outputs[2].path).unwrap();
        assert!(part2.contains("File #1: docs/notes.txt (Part 2/3)\n"));
        assert!(part2.contains("\nFile: notes.txt (Part 2 of 3)\n"));
    }

    #[test]
    fn test_whitespace_only_oversize_file_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), 1_000);
        let mut planner = MergePlanner::new(&config);

        let placement = planner.add("blank.py", "blank.py", &" ".repeat(5_000)).unwrap();
        assert_eq!(placement, Placement::Split { parts: 0 });
        planner.add("a.py", "a.py", "a").unwrap();
        let outputs = planner.finish().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].file_name, "MergedFile-1.txt");
    }

    #[test]
    fn test_merge_staged_counts_only_written_files() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join("TXTs");
        let out = temp_dir.path().join("Merged");
        fs::create_dir_all(&staging).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(staging.join("a.py.txt"), "print(1)").unwrap();
        fs::write(staging.join("blank.py.txt"), " ".repeat(5_000)).unwrap();
        fs::write(staging.join("c.py.txt"), "z".repeat(2_000)).unwrap();

        let config = config(temp_dir.path(), 1_000)
            .with_staging_dir(&staging)
            .with_output_dir(&out);
        let report = merge_staged(&config).unwrap();

        assert_eq!(report.merged_files, 2);
        assert_eq!(report.split_files, 1);
        assert_eq!(report.fallback_entries, 3);
    }

    #[test]
    fn test_list_staged_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.py.txt"), "").unwrap();
        fs::write(temp_dir.path().join("a.py.txt"), "").unwrap();
        fs::write(temp_dir.path().join("_file_map.json"), "{}").unwrap();

        let files = list_staged_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.py.txt", "b.py.txt"]);
    }
}
