use serde::{Deserialize, Serialize};

/// 关键词直接挂在分类下时使用的子分类名称
pub const MISCELLANEOUS: &str = "Miscellaneous";

/// 扁平化后的一条关键词：(分类, 子分类, 关键词)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
pub struct TaxonomyEntry {
    pub category: String,
    pub subcategory: String,
    pub keyword: String,
}

impl TaxonomyEntry {
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            keyword: keyword.into(),
        }
    }
}

/// Flattened keyword taxonomy, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend(&mut self, other: Taxonomy) {
        self.entries.extend(other.entries);
    }

    /// 大小写不敏感的子串查找，返回第一个关键词包含 `name` 的条目
    ///
    /// 仅用于诊断提示；关键词匹配本身区分大小写且按整词匹配。
    pub fn find_keyword(&self, name: &str) -> Option<&TaxonomyEntry> {
        let needle = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.keyword.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_keyword_is_case_insensitive_substring() {
        let taxonomy = Taxonomy::new(vec![
            TaxonomyEntry::new("Crypto", "Hashing", "MessageDigest"),
            TaxonomyEntry::new("Authentication", "Password", "PasswordEncoder"),
        ]);
        let hit = taxonomy.find_keyword("digest").unwrap();
        assert_eq!(hit.keyword, "MessageDigest");
        let hit = taxonomy.find_keyword("PASSWORD").unwrap();
        assert_eq!(hit.subcategory, "Password");
        assert!(taxonomy.find_keyword("sandbox").is_none());
    }
}
