use crate::error::Result;
use crate::feature::model_file::FEATURE_MODEL_FILE;
use crate::source;
use crate::taxonomy::KeywordFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 扫描配置
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// 参与扫描的文件扩展名（不带点）
    pub extensions: Vec<String>,
    /// 相对路径包含该子串（不区分大小写）的文件不扫描
    pub exclude_substring: String,
    /// 遍历目录时是否遵循 .gitignore 等过滤规则
    pub respect_gitignore: bool,
    /// 特征模型输出文件名，位于被扫描仓库根目录
    pub feature_model_file: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["java".to_string()],
            exclude_substring: "test".to_string(),
            respect_gitignore: false,
            feature_model_file: FEATURE_MODEL_FILE.to_string(),
        }
    }
}

impl ScanConfig {
    /// 从 JSON 或 YAML 文件加载，缺失字段使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = source::read_text(path)?;
        let config = match KeywordFormat::from_path(path) {
            Some(KeywordFormat::Json) => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(config)
    }

    pub fn accepts_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.exclude_substring.is_empty() {
            return false;
        }
        relative
            .to_string_lossy()
            .to_lowercase()
            .contains(&self.exclude_substring.to_lowercase())
    }
}
