use anyhow::{Context, Result};
use secfeat_core::{load_feature_model, to_model_string};

/// 解析特征模型并以制表符缩进重新输出
pub fn run(file: &str) -> Result<()> {
    let tree = load_feature_model(file)
        .with_context(|| format!("Failed to load feature model {}", file))?;
    print!("{}", to_model_string(&tree));
    tracing::info!(
        "{} features, {} leaves, root '{}'",
        tree.len(),
        tree.leaves().len(),
        tree.root_name()
    );
    Ok(())
}
