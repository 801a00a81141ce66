// SecFeat Core Library
// 安全特征定位核心库：特征树、关键词分类、行分类状态机、标注写入与目录扫描

pub mod config;
pub mod feature;
pub mod feed;
pub mod report;
pub mod scanner;
pub mod source;
pub mod taxonomy;

// 重新导出常用类型
pub use config::ScanConfig;
pub use feature::merge::{graft, merge};
pub use feature::model_file::{
    load_feature_model, parse_feature_model, save_feature_model, to_model_string,
    FEATURE_MODEL_FILE,
};
pub use feature::{Feature, FeatureId, FeatureTree};
pub use feed::{apply_feed, load_feed, FeatureFeed};
pub use report::{FileReport, RunSummary};
pub use scanner::classifier::{LineClass, ScanState};
pub use scanner::matcher::{KeywordMatcher, MatchGroup};
pub use scanner::session::ScanSession;
pub use scanner::{
    annotate_file, annotate_repository, annotate_source, scan_directory, scan_files, ScanOutcome,
};
pub use taxonomy::{load_keywords, Taxonomy, TaxonomyEntry};

pub mod error {
    use std::path::PathBuf;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CoreError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Failed to read {path}: {source}")]
        Read {
            path: PathBuf,
            source: std::io::Error,
        },

        #[error("Failed to write {path}: {source}")]
        Write {
            path: PathBuf,
            source: std::io::Error,
        },

        #[error("Parse error: {0}")]
        Parse(String),

        #[error("Taxonomy error: {0}")]
        Taxonomy(String),

        #[error("Feature model root '{model_root}' does not match taxonomy root '{taxonomy_root}'")]
        SchemaMismatch {
            taxonomy_root: String,
            model_root: String,
        },

        #[error("Scanner error: {0}")]
        Scanner(String),

        #[error(transparent)]
        Json(#[from] serde_json::Error),

        #[error(transparent)]
        Yaml(#[from] serde_yaml::Error),
    }

    pub type Result<T> = std::result::Result<T, CoreError>;
}
