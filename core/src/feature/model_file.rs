// .feature-model 文本格式
// 每行一个节点名称，缩进表示深度：制表符计 4 列，空格计 1 列

use super::{FeatureId, FeatureTree};
use crate::error::{CoreError, Result};
use crate::source;
use std::collections::HashMap;
use std::path::Path;

pub const FEATURE_MODEL_FILE: &str = ".feature-model";

/// 序列化为缩进文本，每层一个制表符
pub fn to_model_string(tree: &FeatureTree) -> String {
    let mut out = String::new();
    for (depth, id) in tree.preorder() {
        for _ in 0..depth {
            out.push('\t');
        }
        out.push_str(tree.name(id));
        out.push('\n');
    }
    out
}

/// Parses the indented text format back into a tree.
///
/// Indentation widths are mapped to depths in first-seen order, so files
/// indented with two spaces, four spaces or tabs all load the same way.
/// Blank lines are skipped. A second top-level line is rejected.
pub fn parse_feature_model(text: &str) -> Result<FeatureTree> {
    let mut depths: HashMap<usize, usize> = HashMap::new();
    let mut stack: Vec<FeatureId> = Vec::new();
    let mut tree: Option<FeatureTree> = None;

    for (index, line) in text.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }

        let width = indentation_width(line);
        let depth = *depths.entry(width).or_insert(stack.len());
        stack.truncate(depth);

        let parent = stack.last().copied();
        let id = match (tree.as_mut(), parent) {
            (None, _) => {
                let created = FeatureTree::new(name);
                let root = created.root();
                tree = Some(created);
                root
            }
            (Some(existing), Some(parent)) => existing.get_or_add_child(parent, name),
            (Some(existing), None) => {
                return Err(CoreError::Parse(format!(
                    "line {}: '{}' would be a second root next to '{}'",
                    index + 1,
                    name,
                    existing.root_name()
                )));
            }
        };
        stack.push(id);
    }

    tree.ok_or_else(|| CoreError::Parse("feature model is empty".to_string()))
}

fn indentation_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            '\t' => width += 4,
            ' ' => width += 1,
            _ => break,
        }
    }
    width
}

pub fn load_feature_model<P: AsRef<Path>>(path: P) -> Result<FeatureTree> {
    let path = path.as_ref();
    let text = source::read_text(path)?;
    let tree = parse_feature_model(&text)?;
    log::debug!(
        "Loaded feature model {} ({} features, root '{}')",
        path.display(),
        tree.len(),
        tree.root_name()
    );
    Ok(tree)
}

pub fn save_feature_model<P: AsRef<Path>>(tree: &FeatureTree, path: P) -> Result<()> {
    let path = path.as_ref();
    source::write_text(path, &to_model_string(tree))?;
    log::info!("Feature model written to {}", path.display());
    Ok(())
}
