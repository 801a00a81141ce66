use super::model::{Taxonomy, TaxonomyEntry, MISCELLANEOUS};
use crate::error::{CoreError, Result};
use crate::source;
use serde_json::Value;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordFormat {
    Json,
    Yaml,
}

impl KeywordFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// 将嵌套的 分类 -> 子分类 -> 关键词 配置展开为扁平列表
///
/// 分类的值可以是子分类映射，也可以直接是关键词列表（归入 Miscellaneous）。
pub fn flatten_keywords(value: &Value) -> Result<Taxonomy> {
    let categories = value.as_object().ok_or_else(|| {
        CoreError::Taxonomy("top level must map category names to keywords".to_string())
    })?;

    let mut entries = Vec::new();
    for (category, body) in categories {
        match body {
            Value::Object(subcategories) => {
                for (subcategory, keywords) in subcategories {
                    for keyword in keyword_list(category, subcategory, keywords)? {
                        entries.push(TaxonomyEntry::new(category, subcategory, keyword));
                    }
                }
            }
            Value::Array(_) => {
                for keyword in keyword_list(category, MISCELLANEOUS, body)? {
                    entries.push(TaxonomyEntry::new(category, MISCELLANEOUS, keyword));
                }
            }
            other => {
                return Err(CoreError::Taxonomy(format!(
                    "category '{}' must be a mapping or a list, found {}",
                    category,
                    kind_of(other)
                )));
            }
        }
    }
    Ok(Taxonomy::new(entries))
}

fn keyword_list<'a>(category: &str, subcategory: &str, value: &'a Value) -> Result<Vec<&'a str>> {
    let items = value.as_array().ok_or_else(|| {
        CoreError::Taxonomy(format!(
            "'{} : {}' must be a list of keywords, found {}",
            category,
            subcategory,
            kind_of(value)
        ))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                CoreError::Taxonomy(format!(
                    "'{} : {}' contains a non-string keyword: {}",
                    category, subcategory, item
                ))
            })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

pub fn parse_keywords(content: &str, format: KeywordFormat) -> Result<Taxonomy> {
    let value: Value = match format {
        KeywordFormat::Json => serde_json::from_str(content)?,
        KeywordFormat::Yaml => serde_yaml::from_str(content)?,
    };
    flatten_keywords(&value)
}

/// Loads keywords from a JSON/YAML file, or from every such file below a
/// directory (sorted by path). Unparsable files inside a directory are
/// logged and skipped; an explicitly named file must parse.
pub fn load_keywords<P: AsRef<Path>>(path: P) -> Result<Taxonomy> {
    let path = path.as_ref();
    if path.is_file() {
        let format = KeywordFormat::from_path(path).unwrap_or(KeywordFormat::Json);
        let content = source::read_text(path)?;
        return parse_keywords(&content, format);
    }

    let mut taxonomy = Taxonomy::default();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::Taxonomy(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(format) = KeywordFormat::from_path(entry.path()) else {
            continue;
        };
        let content = source::read_text(entry.path())?;
        match parse_keywords(&content, format) {
            Ok(parsed) => taxonomy.extend(parsed),
            Err(e) => log::warn!("Failed to parse keyword file {:?}: {}", entry.path(), e),
        }
    }

    if taxonomy.is_empty() {
        return Err(CoreError::Taxonomy(format!(
            "no keywords found under {}",
            path.display()
        )));
    }
    Ok(taxonomy)
}
