// Feed module - 外部 API 调用标注
// 读取静态分析器导出的 features.json，为每个调用点生成 &line 行内标注

use crate::error::Result;
use crate::scanner::session::ScanSession;
use crate::scanner::writer;
use crate::source;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeatureFeed {
    #[serde(default)]
    pub sources: Vec<FeedSource>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedSource {
    #[serde(default)]
    pub files: Vec<FeedFile>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFile {
    /// 相对于仓库根目录
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub api_calls: Vec<ApiCall>,
}

/// 一个 API 调用点
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiCall {
    /// 从 0 开始的行号（导出器写入的是行下标）
    #[serde(default)]
    pub line: usize,
    /// 限定名，如 `java.security.MessageDigest.digest`
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub features: Vec<String>,
}

/// 读取 feed 文件；文件不存在时视为空 feed
pub fn load_feed<P: AsRef<Path>>(path: P) -> Result<FeatureFeed> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("No API-call feed at {}, skipping library annotations", path.display());
        return Ok(FeatureFeed::default());
    }
    let content = source::read_text(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// 行下标（从 0 开始）到该行全部标签
pub type LineTags = BTreeMap<usize, BTreeSet<String>>;

/// Appends one `// &line[..]` marker per annotated line. Tags are sorted and
/// lines that already carry the exact marker are left alone.
pub fn annotate_lines(text: &str, annotations: &LineTags) -> String {
    let mut lines: Vec<String> = source::split_lines(text)
        .into_iter()
        .map(str::to_string)
        .collect();
    for (index, tags) in annotations {
        let Some(line) = lines.get_mut(*index) else {
            continue;
        };
        let tags: Vec<String> = tags.iter().cloned().collect();
        if let Some(updated) = writer::append_line_marker(line, &tags) {
            *line = updated;
        }
    }
    lines.concat()
}

/// 对 feed 中的每个文件写入行内标注并把标签并入特征模型
///
/// 返回本次 feed 产生的全部标签。读写失败的文件记录日志后跳过。
pub fn apply_feed(session: &mut ScanSession, feed: &FeatureFeed, repo_dir: &Path) -> BTreeSet<String> {
    let mut produced = BTreeSet::new();

    for file in feed.sources.iter().flat_map(|s| s.files.iter()) {
        let file_path = repo_dir.join(&file.path);
        if file.api_calls.is_empty() || !file_path.is_file() {
            continue;
        }

        let original = match source::read_source(&file_path) {
            Ok(original) => original,
            Err(e) => {
                log::error!("Failed to read {}: {}", file_path.display(), e);
                continue;
            }
        };
        let text = &original.text;
        let line_count = source::split_lines(text).len();

        let mut annotations = LineTags::new();
        for call in &file.api_calls {
            if call.features.is_empty() {
                continue;
            }
            if call.line >= line_count {
                log::debug!(
                    "{}: API call '{}' at line {} is out of range",
                    file.path,
                    call.api,
                    call.line
                );
                continue;
            }
            for feature_name in &call.features {
                let tag = writer::api_tag(feature_name, &call.api);
                session.merge_library_tag(feature_name, &tag);
                annotations
                    .entry(call.line)
                    .or_default()
                    .insert(tag.clone());
                produced.insert(tag);
            }
        }

        let updated = annotate_lines(text, &annotations);
        if updated != *text {
            if let Err(e) = source::write_source(&file_path, &updated, original.has_bom) {
                log::error!("Failed to write {}: {}", file_path.display(), e);
            }
        }
    }

    produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_locator_export() {
        let json = r#"{
            "javaVersion": "17",
            "buildSuccess": true,
            "sources": [{
                "files": [{
                    "path": "src/A.java",
                    "apiCalls": [
                        {"line": 3, "api": "java.security.MessageDigest.digest", "features": ["Hashing"]}
                    ]
                }]
            }]
        }"#;
        let feed: FeatureFeed = serde_json::from_str(json).unwrap();
        let call = &feed.sources[0].files[0].api_calls[0];
        assert_eq!(call.line, 3);
        assert_eq!(call.features, vec!["Hashing"]);
    }

    #[test]
    fn annotate_lines_sorts_and_joins_tags() {
        let mut annotations = LineTags::new();
        annotations
            .entry(1)
            .or_default()
            .extend(["API_Hashing_update".to_string(), "API_Encryption_init".to_string()]);
        annotations.entry(9).or_default().insert("API_X_y".to_string());
        let out = annotate_lines("a();\nb();\nc();\n", &annotations);
        assert_eq!(
            out,
            "a();\nb(); // &line[API_Encryption_init, API_Hashing_update]\nc();\n"
        );
        assert_eq!(annotate_lines(&out, &annotations), out);
    }

    fn hashing_session() -> ScanSession {
        use crate::config::ScanConfig;
        use crate::feature::model_file::parse_feature_model;
        use crate::taxonomy::{parse_keywords, KeywordFormat};

        let tree = parse_feature_model("Security\n\tCrypto\n\t\tHashing\n").unwrap();
        let taxonomy = parse_keywords(r#"{"Crypto": {"Hashing": ["MD5"]}}"#, KeywordFormat::Json)
            .unwrap();
        ScanSession::new(tree, taxonomy, ScanConfig::default()).unwrap()
    }

    fn single_call_feed(line: usize) -> FeatureFeed {
        FeatureFeed {
            sources: vec![FeedSource {
                files: vec![FeedFile {
                    path: "A.java".into(),
                    api_calls: vec![ApiCall {
                        line,
                        api: "java.security.MessageDigest.digest".into(),
                        features: vec!["Hashing".into()],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn feed_lines_are_zero_based_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.java");
        std::fs::write(&path, "int a = 0;\nmd.digest();\nreturn a;\n").unwrap();

        let mut session = hashing_session();
        let tags = apply_feed(&mut session, &single_call_feed(1), dir.path());
        assert_eq!(tags.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "int a = 0;\nmd.digest(); // &line[API_Hashing_digest]\nreturn a;\n"
        );
    }

    #[test]
    fn line_zero_is_the_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.java");
        std::fs::write(&path, "md.digest();\nint a = 0;\n").unwrap();

        let mut session = hashing_session();
        let tags = apply_feed(&mut session, &single_call_feed(0), dir.path());
        assert!(tags.contains("API_Hashing_digest"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "md.digest(); // &line[API_Hashing_digest]\nint a = 0;\n"
        );
    }

    #[test]
    fn index_past_last_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.java");
        std::fs::write(&path, "md.digest();\nint a = 0;\n").unwrap();

        let mut session = hashing_session();
        let tags = apply_feed(&mut session, &single_call_feed(2), dir.path());
        assert!(tags.is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "md.digest();\nint a = 0;\n"
        );
    }

    #[test]
    fn missing_feed_file_is_empty() {
        let feed = load_feed("/no/such/features.json").unwrap();
        assert!(feed.sources.is_empty());
    }
}
