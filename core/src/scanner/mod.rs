// Scanner module - 扫描器模块
// 遍历源码目录，分类、匹配并原地写回标注

pub mod classifier;
pub mod matcher;
pub mod session;
pub mod writer;

use crate::error::{CoreError, Result};
use crate::feed::{self, FeatureFeed};
use crate::feature::model_file::save_feature_model;
use crate::report::{short_path, FileReport, LineMatch};
use crate::source;
use classifier::ScanState;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use session::ScanSession;
use std::path::{Path, PathBuf};

/// 单个文件标注后的结果
#[derive(Debug, Clone)]
pub struct AnnotatedSource {
    pub text: String,
    pub matches: Vec<LineMatch>,
    pub pre_annotated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// 整个目录的扫描结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub reports: Vec<FileReport>,
    pub files_scanned: usize,
    pub failed_files: Vec<FailedFile>,
}

/// 对一段源码执行分类、匹配和标注，不涉及文件读写
///
/// 每次调用使用全新的 `ScanState`；标签序号、关键词频率和特征模型
/// 记录在 `session` 中，跨文件累积。
pub fn annotate_source(session: &mut ScanSession, text: &str) -> AnnotatedSource {
    let mut state = ScanState::new();
    let mut out = String::with_capacity(text.len() + 64);
    let mut matches = Vec::new();

    for (index, line) in source::split_lines(text).into_iter().enumerate() {
        let line_number = index + 1;

        if !state.classify(line).is_eligible() {
            out.push_str(line);
            continue;
        }

        let groups = session.matcher().match_line(line);
        if groups.is_empty() || !state.mark_wrapped(line_number) {
            out.push_str(line);
            continue;
        }

        let tags = session.record_match(&groups);
        writer::wrap_line(&mut out, line, &tags);
        matches.push(LineMatch {
            line_number,
            source: line.trim().to_string(),
            groups,
            tags,
        });
    }

    let pre_annotated = state.new_inline_tags();
    session.add_pre_annotated(pre_annotated);
    AnnotatedSource {
        text: out,
        matches,
        pre_annotated,
    }
}

/// 标注单个文件并原地写回；没有匹配时返回 `None`
pub fn annotate_file(session: &mut ScanSession, root: &Path, path: &Path) -> Result<Option<FileReport>> {
    let original = source::read_source(path)?;
    let annotated = annotate_source(session, &original.text);

    if annotated.text != original.text {
        source::write_source(path, &annotated.text, original.has_bom)?;
    }

    log::debug!("{}: {} match(es)", path.display(), annotated.matches.len());
    if annotated.matches.is_empty() {
        return Ok(None);
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Some(FileReport {
        file_name,
        file_path: short_path(root, path),
        matches: annotated.matches.iter().map(LineMatch::consolidate).collect(),
    }))
}

/// 按文件名排序遍历，返回需要扫描的源文件
pub fn collect_source_files(session: &ScanSession, root: &Path) -> Vec<PathBuf> {
    let config = session.config();
    let walker = WalkBuilder::new(root)
        .standard_filters(config.respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.accepts_extension(path) && !config.is_excluded(relative) {
            files.push(path.to_path_buf());
        }
    }
    files
}

/// 扫描整个目录；单个文件失败只记录并跳过
pub fn scan_directory(session: &mut ScanSession, root: &Path) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Err(CoreError::Scanner(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }

    let files = collect_source_files(session, root);
    log::info!("Found {} files to scan in {}", files.len(), root.display());
    Ok(scan_files(session, root, files))
}

/// 依次标注给定文件；读写失败的文件记入 `failed_files`，其余文件照常处理
pub fn scan_files(session: &mut ScanSession, root: &Path, files: Vec<PathBuf>) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    for path in files {
        outcome.files_scanned += 1;
        match annotate_file(session, root, &path) {
            Ok(Some(report)) => outcome.reports.push(report),
            Ok(None) => {}
            Err(e) => {
                log::error!("Error annotating file {}: {}", path.display(), e);
                outcome.failed_files.push(FailedFile {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Annotated {} locations in {} of {} files",
        session.locations(),
        outcome.reports.len(),
        outcome.files_scanned
    );
    outcome
}

/// 完整流程：先应用外部 API 调用标注，再扫描关键词，最后写出特征模型
///
/// Not safe to run twice on the same checkout: begin/end markers from an
/// earlier run are not recognised as annotations.
pub fn annotate_repository(
    session: &mut ScanSession,
    repo_dir: &Path,
    api_feed: Option<&FeatureFeed>,
) -> Result<ScanOutcome> {
    if let Some(api_feed) = api_feed {
        let tags = feed::apply_feed(session, api_feed, repo_dir);
        log::info!("Applied {} library tag(s) from the API-call feed", tags.len());
    }

    let outcome = scan_directory(session, repo_dir)?;

    let model_path = repo_dir.join(&session.config().feature_model_file);
    save_feature_model(session.feature_model(), &model_path)?;
    Ok(outcome)
}
