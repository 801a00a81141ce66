// Feature module - 特征树
// 以 arena 方式保存节点，父节点只保存索引，不持有所有权

pub mod merge;
pub mod model_file;

use serde::{Deserialize, Serialize};

/// 特征树节点句柄（arena 下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(usize);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 单个特征节点：分类、子分类或标签
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub parent: Option<FeatureId>,
    pub children: Vec<FeatureId>,
}

/// n 叉特征树，节点只增不删
///
/// `nodes[0]` 永远是根节点。同一父节点下的子节点名称唯一，
/// 子节点顺序即插入顺序。
#[derive(Debug, Clone)]
pub struct FeatureTree {
    nodes: Vec<Feature>,
}

impl FeatureTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Feature {
                name: root_name.into(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> FeatureId {
        FeatureId(0)
    }

    pub fn root_name(&self) -> &str {
        &self.nodes[0].name
    }

    pub fn get(&self, id: FeatureId) -> &Feature {
        &self.nodes[id.0]
    }

    pub fn name(&self, id: FeatureId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn parent(&self, id: FeatureId) -> Option<FeatureId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: FeatureId) -> &[FeatureId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 在 `parent` 的直接子节点中按名称查找
    pub fn find_child(&self, parent: FeatureId, name: &str) -> Option<FeatureId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    /// 复用同名子节点，不存在时才创建
    pub fn get_or_add_child(&mut self, parent: FeatureId, name: &str) -> FeatureId {
        if let Some(existing) = self.find_child(parent, name) {
            return existing;
        }
        let id = FeatureId(self.nodes.len());
        self.nodes.push(Feature {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Depth-first search for the first node named `name`.
    ///
    /// Uses an explicit stack seeded with the root; children are pushed in
    /// insertion order, so the most recently added sibling is visited first.
    pub fn dfs(&self, name: &str) -> Option<FeatureId> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().copied());
        }
        None
    }

    /// 从根到 `id` 的完整祖先链（含两端）
    pub fn path_from_root(&self, id: FeatureId) -> Vec<FeatureId> {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.nodes[cursor.0].parent {
            chain.push(parent);
            cursor = parent;
        }
        chain.reverse();
        chain
    }

    pub fn depth(&self, id: FeatureId) -> usize {
        self.path_from_root(id).len() - 1
    }

    /// 先序遍历，返回 (深度, 节点)
    pub fn preorder(&self) -> Vec<(usize, FeatureId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0usize, self.root())];
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }

    /// 叶子节点名称（按先序）
    pub fn leaves(&self) -> Vec<&str> {
        self.preorder()
            .into_iter()
            .filter(|(_, id)| self.nodes[id.0].children.is_empty() && *id != self.root())
            .map(|(_, id)| self.nodes[id.0].name.as_str())
            .collect()
    }
}
