// 仓库获取
// 本地目录直接使用；远程地址克隆到 repos 目录下

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub dir: PathBuf,
    pub name: String,
}

pub fn is_remote(target: &str) -> bool {
    ["http://", "https://", "ssh://", "git://", "git@"]
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

/// 仓库名：地址最后一段，去掉 `.git` 后缀
pub fn project_name(target: &str) -> String {
    let last = target
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(target);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

pub fn acquire(target: &str, repos_dir: &Path) -> Result<Repository> {
    if !is_remote(target) {
        let dir = PathBuf::from(target);
        if !dir.is_dir() {
            bail!("'{}' is neither a directory nor a git URL", target);
        }
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", target))?;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| project_name(target));
        return Ok(Repository { dir, name });
    }

    let name = project_name(target);
    let dir = repos_dir.join(&name);
    if dir.exists() {
        tracing::info!("Repository '{}' already exists in {}", name, repos_dir.display());
        return Ok(Repository { dir, name });
    }

    std::fs::create_dir_all(repos_dir)
        .with_context(|| format!("Failed to create {}", repos_dir.display()))?;
    let status = Command::new("git")
        .arg("clone")
        .arg(target)
        .arg(&dir)
        .status()
        .context("Failed to run git clone")?;
    if !status.success() {
        bail!("Failed to clone repository {} ({})", target, status);
    }
    tracing::info!("Cloned '{}' into {}", name, repos_dir.display());
    Ok(Repository { dir, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_strips_git_suffix() {
        assert_eq!(project_name("https://github.com/acme/shop.git"), "shop");
        assert_eq!(project_name("https://github.com/acme/shop/"), "shop");
        assert_eq!(project_name("git@github.com:acme/shop.git"), "shop");
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://github.com/acme/shop.git"));
        assert!(is_remote("git@github.com:acme/shop.git"));
        assert!(!is_remote("./shop"));
        assert!(!is_remote("/tmp/shop"));
    }

    #[test]
    fn local_directory_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let repo = acquire(dir.path().to_str().unwrap(), Path::new("unused")).unwrap();
        assert_eq!(repo.dir, dir.path().canonicalize().unwrap());
        assert!(!repo.name.is_empty());
    }

    #[test]
    fn missing_local_path_is_an_error() {
        assert!(acquire("/no/such/project", Path::new("repos")).is_err());
    }
}
