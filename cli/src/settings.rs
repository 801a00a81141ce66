// 运行配置
// 优先级：命令行参数 > 环境变量（含 .env）> 默认值

use std::path::PathBuf;

pub const DEFAULT_TAXONOMY: &str = "taxonomy.feature_model";
pub const DEFAULT_KEYWORDS: &str = "SecList.json";
pub const DEFAULT_FEATURES: &str = "features.json";
pub const DEFAULT_REPOS_DIR: &str = "repos";

pub const ENV_TAXONOMY: &str = "SECFEAT_TAXONOMY";
pub const ENV_KEYWORDS: &str = "SECFEAT_KEYWORDS";
pub const ENV_FEATURES: &str = "SECFEAT_FEATURES";
pub const ENV_REPOS_DIR: &str = "SECFEAT_REPOS_DIR";

pub fn resolve(flag: Option<PathBuf>, env_key: &str, default: &str) -> PathBuf {
    flag.or_else(|| {
        std::env::var(env_key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(default))
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub taxonomy: PathBuf,
    pub keywords: PathBuf,
    pub features: PathBuf,
    pub repos_dir: PathBuf,
}

impl Settings {
    pub fn new(
        taxonomy: Option<PathBuf>,
        keywords: Option<PathBuf>,
        features: Option<PathBuf>,
        repos_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            taxonomy: resolve(taxonomy, ENV_TAXONOMY, DEFAULT_TAXONOMY),
            keywords: resolve(keywords, ENV_KEYWORDS, DEFAULT_KEYWORDS),
            features: resolve(features, ENV_FEATURES, DEFAULT_FEATURES),
            repos_dir: resolve(repos_dir, ENV_REPOS_DIR, DEFAULT_REPOS_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_env_and_default() {
        std::env::set_var("SECFEAT_TEST_FLAG_WINS", "from-env.json");
        let path = resolve(
            Some(PathBuf::from("from-flag.json")),
            "SECFEAT_TEST_FLAG_WINS",
            "default.json",
        );
        assert_eq!(path, PathBuf::from("from-flag.json"));
    }

    #[test]
    fn env_wins_over_default() {
        std::env::set_var("SECFEAT_TEST_ENV_WINS", "from-env.json");
        let path = resolve(None, "SECFEAT_TEST_ENV_WINS", "default.json");
        assert_eq!(path, PathBuf::from("from-env.json"));
    }

    #[test]
    fn blank_env_falls_back_to_default() {
        std::env::set_var("SECFEAT_TEST_BLANK", "  ");
        let path = resolve(None, "SECFEAT_TEST_BLANK", "default.json");
        assert_eq!(path, PathBuf::from("default.json"));
        assert_eq!(
            resolve(None, "SECFEAT_TEST_UNSET_KEY", DEFAULT_KEYWORDS),
            PathBuf::from("SecList.json")
        );
    }
}
