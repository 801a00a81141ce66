use anyhow::{Context, Result};
use secfeat_core::load_keywords;

use crate::settings::{resolve, DEFAULT_KEYWORDS, ENV_KEYWORDS};

/// 打印扁平化后的关键词列表
pub fn run(keywords: Option<String>) -> Result<()> {
    let path = resolve(keywords.map(Into::into), ENV_KEYWORDS, DEFAULT_KEYWORDS);
    let taxonomy = load_keywords(&path)
        .with_context(|| format!("Failed to load keywords from {}", path.display()))?;

    for entry in taxonomy.entries() {
        println!("{} : {} : {}", entry.category, entry.subcategory, entry.keyword);
    }
    tracing::info!("{} keywords in {}", taxonomy.len(), path.display());
    Ok(())
}
