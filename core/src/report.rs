// 报告输出
// 单文件匹配报告、运行摘要与 JSON 持久化

use crate::error::Result;
use crate::scanner::matcher::MatchGroup;
use crate::scanner::session::{KeywordCounter, ScanSession};
use crate::scanner::ScanOutcome;
use crate::source;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// 扫描过程中单行的匹配记录
#[derive(Debug, Clone, PartialEq)]
pub struct LineMatch {
    pub line_number: usize,
    pub source: String,
    pub groups: Vec<MatchGroup>,
    pub tags: Vec<String>,
}

impl LineMatch {
    pub fn location(&self) -> String {
        format!("line {}", self.line_number)
    }

    pub fn consolidate(&self) -> ConsolidatedMatch {
        ConsolidatedMatch {
            source_code: self.source.clone(),
            location: self.location(),
            keywords_found: keywords_summary(&self.groups),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedMatch {
    #[serde(rename = "Source Code")]
    pub source_code: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Keywords Found")]
    pub keywords_found: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "File Path")]
    pub file_path: String,
    #[serde(rename = "Matches")]
    pub matches: Vec<ConsolidatedMatch>,
}

/// "Crypto : Hashing : [MD5, SHA1], Crypto : Encryption : [Cipher]"
///
/// 同一分组内重复的关键词只保留第一次出现。
pub fn keywords_summary(groups: &[MatchGroup]) -> String {
    groups
        .iter()
        .map(|group| {
            let mut unique: Vec<&str> = Vec::new();
            for keyword in &group.keywords {
                if !unique.contains(&keyword.as_str()) {
                    unique.push(keyword);
                }
            }
            format!("{} : [{}]", group.key(), unique.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 相对于扫描根目录的路径；包含 `src` 目录时从该目录开始截取
pub fn short_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let start = parts.iter().position(|p| p == "src").unwrap_or(0);
    parts[start..].join("/")
}

pub fn results_file_name(repo_name: &str) -> String {
    format!("{}_PotentialFeatLocations.json", repo_name)
}

pub fn save_results<P: AsRef<Path>>(path: P, reports: &[FileReport]) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(reports)?;
    source::write_text(path, &json)?;
    log::info!("Results saved to {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStat {
    pub category: String,
    pub subcategory: String,
    pub keyword: String,
    pub count: usize,
    pub percentage: f64,
}

impl fmt::Display for KeywordStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} : {}: {} matches ({:.2}%)",
            self.category, self.subcategory, self.keyword, self.count, self.percentage
        )
    }
}

/// 前 n 个关键词，百分比以标注位置总数为分母
pub fn top_keywords(counter: &KeywordCounter, total_locations: usize, n: usize) -> Vec<KeywordStat> {
    counter
        .most_common(n)
        .into_iter()
        .map(|(key, count)| KeywordStat {
            category: key.category.clone(),
            subcategory: key.subcategory.clone(),
            keyword: key.keyword.clone(),
            count,
            percentage: if total_locations == 0 {
                0.0
            } else {
                count as f64 / total_locations as f64 * 100.0
            },
        })
        .collect()
}

/// 运行摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub files_scanned: usize,
    pub files_with_matches: usize,
    pub failed_files: usize,
    pub pre_annotated_features: usize,
    pub feature_locations: usize,
    pub library_tags: usize,
    pub top_keywords: Vec<KeywordStat>,
}

impl RunSummary {
    pub fn new(session: &ScanSession, outcome: &ScanOutcome, top: usize) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            files_scanned: outcome.files_scanned,
            files_with_matches: outcome.reports.len(),
            failed_files: outcome.failed_files.len(),
            pre_annotated_features: session.pre_annotated(),
            feature_locations: session.locations(),
            library_tags: session.library_tags().len(),
            top_keywords: top_keywords(session.keyword_counter(), session.locations(), top),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Number of Features Identified by the Automated Tool: {} Features",
            self.pre_annotated_features
        )?;
        writeln!(
            f,
            "Number of Security Feature Possible Locations: {}",
            self.feature_locations
        )?;
        writeln!(f, "Number of Files with Matches: {}", self.files_with_matches)?;
        if self.failed_files > 0 {
            writeln!(f, "Number of Files Skipped on Error: {}", self.failed_files)?;
        }
        writeln!(f)?;
        writeln!(f, "Top {} Keyword Matches:", self.top_keywords.len())?;
        for stat in &self.top_keywords {
            writeln!(f, "{}", stat)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::session::KeywordKey;

    fn group(category: &str, subcategory: &str, keywords: &[&str]) -> MatchGroup {
        MatchGroup {
            category: category.into(),
            subcategory: subcategory.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn summary_string_deduplicates_keywords() {
        let groups = vec![
            group("Crypto", "Hashing", &["MD5", "SHA1", "MD5"]),
            group("Crypto", "Encryption", &["Cipher"]),
        ];
        assert_eq!(
            keywords_summary(&groups),
            "Crypto : Hashing : [MD5, SHA1], Crypto : Encryption : [Cipher]"
        );
    }

    #[test]
    fn consolidated_match_serializes_with_report_names() {
        let m = LineMatch {
            line_number: 12,
            source: "byte[] h = MD5.digest(x);".into(),
            groups: vec![group("Crypto", "Hashing", &["MD5"])],
            tags: vec!["KeywordMatch_1_Hashing".into()],
        };
        let json = serde_json::to_value(m.consolidate()).unwrap();
        assert_eq!(json["Location"], "line 12");
        assert_eq!(json["Keywords Found"], "Crypto : Hashing : [MD5]");
        assert_eq!(json["Source Code"], "byte[] h = MD5.digest(x);");
    }

    #[test]
    fn short_path_starts_at_src() {
        let root = Path::new("/repos/app");
        assert_eq!(
            short_path(root, Path::new("/repos/app/module/src/main/java/A.java")),
            "src/main/java/A.java"
        );
        assert_eq!(short_path(root, Path::new("/repos/app/lib/B.java")), "lib/B.java");
    }

    #[test]
    fn top_keywords_percentages() {
        let mut counter = KeywordCounter::default();
        for keyword in ["MD5", "MD5", "MD5", "Cipher"] {
            counter.increment(KeywordKey {
                category: "Crypto".into(),
                subcategory: "Any".into(),
                keyword: keyword.into(),
            });
        }
        let stats = top_keywords(&counter, 4, 10);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].keyword, "MD5");
        assert!((stats[0].percentage - 75.0).abs() < 1e-9);
        assert_eq!(stats[0].to_string(), "Crypto : Any : MD5: 3 matches (75.00%)");
        assert_eq!(top_keywords(&counter, 0, 1)[0].percentage, 0.0);
    }

    #[test]
    fn save_results_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(results_file_name("demo"));
        let reports = vec![FileReport {
            file_name: "A.java".into(),
            file_path: "src/A.java".into(),
            matches: vec![],
        }];
        save_results(&path, &reports).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"File Name\": \"A.java\""));
        let back: Vec<FileReport> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, reports);
    }
}
