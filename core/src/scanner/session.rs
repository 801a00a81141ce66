use super::matcher::{KeywordMatcher, MatchGroup};
use super::writer;
use crate::config::ScanConfig;
use crate::error::{CoreError, Result};
use crate::feature::merge::{graft, merge};
use crate::feature::{FeatureId, FeatureTree};
use crate::taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 关键词频率统计键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordKey {
    pub category: String,
    pub subcategory: String,
    pub keyword: String,
}

/// 关键词计数器，排名并列时按首次出现顺序
#[derive(Debug, Clone, Default)]
pub struct KeywordCounter {
    counts: HashMap<KeywordKey, usize>,
    order: Vec<KeywordKey>,
}

impl KeywordCounter {
    pub fn increment(&mut self, key: KeywordKey) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.clone());
                self.counts.insert(key, 1);
            }
        }
    }

    pub fn get(&self, key: &KeywordKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn most_common(&self, n: usize) -> Vec<(&KeywordKey, usize)> {
        let mut ranked: Vec<(&KeywordKey, usize)> =
            self.order.iter().map(|key| (key, self.counts[key])).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// One annotation run.
///
/// Owns everything that is shared across files: the tag sequence, the
/// keyword frequencies and the feature model under construction. Files are
/// processed one at a time through `&mut ScanSession`, so there is a single
/// writer for all of it.
pub struct ScanSession {
    config: ScanConfig,
    taxonomy_tree: FeatureTree,
    taxonomy: Taxonomy,
    matcher: KeywordMatcher,
    feature_model: FeatureTree,
    next_sequence: u64,
    keyword_counter: KeywordCounter,
    keyword_tags: Vec<String>,
    locations: usize,
    library_tags: BTreeSet<String>,
    pre_annotated: usize,
}

impl ScanSession {
    pub fn new(taxonomy_tree: FeatureTree, taxonomy: Taxonomy, config: ScanConfig) -> Result<Self> {
        let feature_model = FeatureTree::new(taxonomy_tree.root_name());
        Self::with_feature_model(taxonomy_tree, taxonomy, config, feature_model)
    }

    /// 在已有特征模型上继续构建；根节点名称必须与分类树一致
    pub fn with_feature_model(
        taxonomy_tree: FeatureTree,
        taxonomy: Taxonomy,
        config: ScanConfig,
        feature_model: FeatureTree,
    ) -> Result<Self> {
        if taxonomy_tree.root_name() != feature_model.root_name() {
            return Err(CoreError::SchemaMismatch {
                taxonomy_root: taxonomy_tree.root_name().to_string(),
                model_root: feature_model.root_name().to_string(),
            });
        }
        let matcher = KeywordMatcher::new(&taxonomy)?;
        log::debug!(
            "Scan session ready: {} keywords, taxonomy root '{}'",
            matcher.len(),
            taxonomy_tree.root_name()
        );
        Ok(Self {
            config,
            taxonomy_tree,
            taxonomy,
            matcher,
            feature_model,
            next_sequence: 1,
            keyword_counter: KeywordCounter::default(),
            keyword_tags: Vec::new(),
            locations: 0,
            library_tags: BTreeSet::new(),
            pre_annotated: 0,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn taxonomy_tree(&self) -> &FeatureTree {
        &self.taxonomy_tree
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    pub fn feature_model(&self) -> &FeatureTree {
        &self.feature_model
    }

    pub fn into_feature_model(self) -> FeatureTree {
        self.feature_model
    }

    pub fn keyword_counter(&self) -> &KeywordCounter {
        &self.keyword_counter
    }

    /// 本次运行新生成的关键词标签，按生成顺序
    pub fn keyword_tags(&self) -> &[String] {
        &self.keyword_tags
    }

    /// 被 begin/end 包裹的行数
    pub fn locations(&self) -> usize {
        self.locations
    }

    pub fn library_tags(&self) -> &BTreeSet<String> {
        &self.library_tags
    }

    /// 扫描前已存在的不同行内标注数量（按文件去重后累加）
    pub fn pre_annotated(&self) -> usize {
        self.pre_annotated
    }

    pub(crate) fn add_pre_annotated(&mut self, count: usize) {
        self.pre_annotated += count;
    }

    /// 为一行的全部命中分组生成标签，每个分组一个
    ///
    /// 标签挂到特征模型的 分类/子分类 路径下，并累加关键词频率。
    pub fn record_match(&mut self, groups: &[MatchGroup]) -> Vec<String> {
        let mut tags = Vec::with_capacity(groups.len());
        for group in groups {
            for keyword in &group.keywords {
                self.keyword_counter.increment(KeywordKey {
                    category: group.category.clone(),
                    subcategory: group.subcategory.clone(),
                    keyword: keyword.clone(),
                });
            }

            let tag = writer::keyword_tag(self.next_sequence, &group.subcategory);
            self.next_sequence += 1;
            graft(
                &mut self.feature_model,
                &[group.category.as_str(), group.subcategory.as_str()],
                &tag,
            );
            self.keyword_tags.push(tag.clone());
            tags.push(tag);
        }
        if !tags.is_empty() {
            self.locations += 1;
        }
        tags
    }

    /// 将外部 API 调用标签按分类树路径并入特征模型
    ///
    /// 标签总会记入 `library_tags`；分类树中不存在 `feature_name` 时特征模型保持不变。
    pub fn merge_library_tag(&mut self, feature_name: &str, tag: &str) -> Option<FeatureId> {
        self.library_tags.insert(tag.to_string());
        let merged = merge(&self.taxonomy_tree, &mut self.feature_model, feature_name, tag);
        if merged.is_none() {
            match self.taxonomy.find_keyword(feature_name) {
                Some(hint) => log::debug!(
                    "Feature '{}' is not in the taxonomy tree (closest keyword: {} : {} : {})",
                    feature_name,
                    hint.category,
                    hint.subcategory,
                    hint.keyword
                ),
                None => log::debug!("Feature '{}' is not in the taxonomy tree", feature_name),
            }
        }
        merged
    }
}
